//! Integration test: a skill library on disk, read through `Library::open` and the tools.

use lib::skills::Library;
use lib::templates;
use lib::tools::{self, GetSkillArgs, ListSkillsArgs, ScaffoldArgs};
use std::path::{Path, PathBuf};

struct TempLibrary {
    root: PathBuf,
}

impl TempLibrary {
    fn new() -> Self {
        let root = std::env::temp_dir().join(format!("skilldex-fs-test-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&root).expect("create temp root");
        Self { root }
    }

    fn write(&self, rel: &str, content: &str) -> &Self {
        let path = self.root.join(rel);
        std::fs::create_dir_all(path.parent().expect("parent")).expect("create dirs");
        std::fs::write(&path, content).expect("write file");
        self
    }

    fn path(&self) -> &Path {
        &self.root
    }
}

impl Drop for TempLibrary {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.root);
    }
}

fn sample() -> TempLibrary {
    let tmp = TempLibrary::new();
    tmp.write(
        "backend-patterns/index.md",
        "# Backend Patterns\n\n> Structure for HTTP services\n",
    )
    .write(
        "backend-patterns/controller.md",
        "# Controller\n\n## Rules\n- Keep controllers thin\n- Validate input at the edge\n",
    )
    .write("backend-patterns/service.md", "# Service\n\nBusiness logic lives here.\n")
    .write(
        "backend-patterns/templates/{{name}}.controller.ts.hbs",
        "export class {{namePascal}}Controller {}\n",
    )
    .write("backend-patterns/notes.txt", "not a skill")
    .write("database-patterns/prisma.md", "# Prisma\n\nRun prisma migrate in CI.\n")
    .write(".git/HEAD", "ref: refs/heads/main");
    tmp
}

#[test]
fn lists_categories_and_skills_from_disk() {
    let tmp = sample();
    let library = Library::open(tmp.path());
    let names: Vec<_> = library.categories().into_iter().map(|c| c.name).collect();
    assert_eq!(names, vec!["backend-patterns", "database-patterns"]);
    assert_eq!(
        library.skill_ids(),
        vec![
            "backend-patterns/controller",
            "backend-patterns/service",
            "database-patterns/prisma"
        ]
    );

    let out = tools::list_skills(&library, &ListSkillsArgs::default());
    assert!(out.contains("2 categories, 3 skills"));
    assert!(out.contains("> Structure for HTTP services"));
    assert!(!out.contains("notes"));
}

#[test]
fn resolves_skills_and_overviews() {
    let tmp = sample();
    let library = Library::open(tmp.path());

    let doc = library.resolve("backend-patterns/controller").expect("skill");
    assert_eq!(doc.display_name, "Controller");
    assert!(doc.content.contains("Keep controllers thin"));

    let overview = library.resolve("backend-patterns").expect("overview");
    assert_eq!(overview.id, "backend-patterns/index");

    assert!(library.resolve("database-patterns").is_err());
    let out = tools::get_skill(
        &library,
        &GetSkillArgs {
            id: Some("controler".to_string()),
            search: None,
        },
    );
    assert!(out.starts_with("Skill \"controler\" not found."));
}

#[test]
fn edits_are_visible_without_reopening() {
    let tmp = sample();
    let library = Library::open(tmp.path());
    assert!(library.resolve("frontend-patterns/hooks").is_err());
    tmp.write("frontend-patterns/hooks.md", "# Hooks\n");
    assert!(library.resolve("frontend-patterns/hooks").is_ok());
}

#[test]
fn search_matches_content() {
    let tmp = sample();
    let library = Library::open(tmp.path());
    let ids: Vec<_> = library.search("MIGRATE").into_iter().map(|d| d.id).collect();
    assert_eq!(ids, vec!["database-patterns/prisma"]);
}

#[test]
fn scaffold_renders_templates_from_disk() {
    let tmp = sample();
    let library = Library::open(tmp.path());
    let no_overrides: Vec<(String, String)> = Vec::new();
    let result = templates::scaffold(&library, "backend-patterns", "user-profile", no_overrides);
    assert_eq!(result.files.len(), 1);
    assert_eq!(result.files[0].filename, "user-profile.controller.ts");
    assert_eq!(result.files[0].content, "export class UserProfileController {}\n");

    let out = tools::scaffold(
        &library,
        &ScaffoldArgs {
            category: "database-patterns".to_string(),
            name: "user".to_string(),
            variables: None,
        },
    );
    assert!(out.starts_with("No templates found for category \"database-patterns\""));
}

#[test]
fn missing_root_is_an_empty_library() {
    let root = std::env::temp_dir().join(format!("skilldex-missing-{}", uuid::Uuid::new_v4()));
    let library = Library::open(&root);
    assert!(library.categories().is_empty());
    assert!(library.search("anything").is_empty());
    let out = tools::list_skills(&library, &ListSkillsArgs::default());
    assert!(out.contains("The skill library is empty"));
}
