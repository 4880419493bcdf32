//! Integration tests for project and solution file lookup

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use kuduscript_core::config::GeneratorConfig;
use kuduscript_core::error::{FileKind, LocatorError};
use kuduscript_core::locator::locate;
use kuduscript_core::request::{GenerationRequest, InvocationOptions, ProjectTypeFlag};
use kuduscript_core::types::ProjectType;

fn touch(root: &Path, relative: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, "").unwrap();
}

fn request(root: &Path, options: InvocationOptions) -> GenerationRequest {
    let options = options.with_repository_root(root);
    GenerationRequest::build(&options, root, &GeneratorConfig::new()).unwrap()
}

fn flag(project_type: ProjectType) -> InvocationOptions {
    InvocationOptions::new().with_project_type(ProjectTypeFlag::new(project_type))
}

#[test]
fn finds_single_project_and_solution() {
    let temp = TempDir::new().unwrap();
    touch(temp.path(), "App.sln");
    touch(temp.path(), "src/App/App.csproj");

    let resolved = locate(&request(temp.path(), flag(ProjectType::AspWap))).unwrap();

    assert_eq!(
        resolved.project_file.as_deref(),
        Some(temp.path().join("src/App/App.csproj").as_path())
    );
    assert_eq!(
        resolved.solution_file.as_deref(),
        Some(temp.path().join("App.sln").as_path())
    );
}

#[test]
fn two_go_modules_are_ambiguous() {
    let temp = TempDir::new().unwrap();
    touch(temp.path(), "a/go.mod");
    touch(temp.path(), "b/go.mod");

    let err = locate(&request(temp.path(), flag(ProjectType::Go))).unwrap_err();

    match err {
        LocatorError::Ambiguous {
            kind, candidates, ..
        } => {
            assert_eq!(kind, FileKind::Project);
            assert_eq!(
                candidates,
                vec![temp.path().join("a/go.mod"), temp.path().join("b/go.mod")]
            );
        }
        other => panic!("expected ambiguity, got {other:?}"),
    }
}

#[test]
fn explicit_project_resolves_ambiguity() {
    let temp = TempDir::new().unwrap();
    touch(temp.path(), "a/go.mod");
    touch(temp.path(), "b/go.mod");

    let options = InvocationOptions::new().with_project_type(ProjectTypeFlag::with_project_file(
        ProjectType::Go,
        temp.path().join("b/go.mod"),
    ));
    let resolved = locate(&request(temp.path(), options)).unwrap();

    assert_eq!(
        resolved.project_file.as_deref(),
        Some(temp.path().join("b/go.mod").as_path())
    );
}

#[test]
fn missing_project_is_not_found() {
    let temp = TempDir::new().unwrap();
    touch(temp.path(), "README.md");

    let err = locate(&request(temp.path(), flag(ProjectType::AspNetCore))).unwrap_err();

    assert!(matches!(
        err,
        LocatorError::NotFound {
            kind: FileKind::Project,
            ..
        }
    ));
    assert!(err.to_string().contains("*.csproj"));
}

#[test]
fn solution_is_required_unless_disabled() {
    let temp = TempDir::new().unwrap();
    touch(temp.path(), "Web/Web.csproj");

    let err = locate(&request(temp.path(), flag(ProjectType::AspWap))).unwrap_err();
    assert!(matches!(
        err,
        LocatorError::NotFound {
            kind: FileKind::Solution,
            ..
        }
    ));

    let resolved = locate(&request(
        temp.path(),
        flag(ProjectType::AspWap).with_no_solution(true),
    ))
    .unwrap();
    assert!(resolved.solution_file.is_none());
}

#[test]
fn dependency_directories_are_not_searched() {
    let temp = TempDir::new().unwrap();
    touch(temp.path(), "Api/Api.csproj");
    touch(temp.path(), "node_modules/pkg/Tool.csproj");
    touch(temp.path(), ".git/modules/Other.csproj");

    let resolved = locate(&request(temp.path(), flag(ProjectType::AspNetCore))).unwrap();

    assert_eq!(
        resolved.project_file.as_deref(),
        Some(temp.path().join("Api/Api.csproj").as_path())
    );
}

#[test]
fn explicit_file_must_exist() {
    let temp = TempDir::new().unwrap();
    let options = flag(ProjectType::Basic).with_project_file(temp.path().join("missing.csproj"));

    let err = locate(&request(temp.path(), options)).unwrap_err();

    assert!(matches!(
        err,
        LocatorError::ExplicitFileMissing {
            kind: FileKind::Project,
            ..
        }
    ));
}

#[test]
fn explicit_file_must_be_inside_repository() {
    let temp = TempDir::new().unwrap();
    let repo = temp.path().join("repo");
    fs::create_dir_all(&repo).unwrap();
    touch(temp.path(), "elsewhere/App.sln");

    let options =
        flag(ProjectType::Basic).with_solution_file(temp.path().join("elsewhere/App.sln"));
    let err = locate(&request(&repo, options)).unwrap_err();

    assert!(matches!(err, LocatorError::OutsideRepository { .. }));
}

#[test]
fn missing_site_directory_is_reported() {
    let temp = TempDir::new().unwrap();
    let options = flag(ProjectType::Node).with_site_path(temp.path().join("web"));

    let err = locate(&request(temp.path(), options)).unwrap_err();

    assert!(matches!(err, LocatorError::SiteMissing(_)));
}

/// Project-file types with a single-match fixture and a two-match fixture.
const PROJECT_FILE_CASES: &[(ProjectType, &str, [&str; 2])] = &[
    (ProjectType::AspWap, "Web/Web.csproj", ["A/A.csproj", "B/B.vbproj"]),
    (ProjectType::AspNetCore, "Api/Api.fsproj", ["A/A.csproj", "B/B.fsproj"]),
    (ProjectType::DotNetConsole, "Job/Job.vbproj", ["A/A.csproj", "B/B.vbproj"]),
    (ProjectType::Go, "svc/go.mod", ["a/go.mod", "b/go.mod"]),
];

#[test]
fn every_project_file_type_finds_exactly_one_match() {
    for (project_type, single, _) in PROJECT_FILE_CASES {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "App.sln");
        touch(temp.path(), single);

        let resolved = locate(&request(temp.path(), flag(*project_type)))
            .unwrap_or_else(|e| panic!("{project_type}: {e}"));

        assert_eq!(
            resolved.project_file.as_deref(),
            Some(temp.path().join(single).as_path()),
            "{project_type}"
        );
    }
}

#[test]
fn every_project_file_type_reports_zero_matches() {
    for (project_type, _, _) in PROJECT_FILE_CASES {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "App.sln");

        let err = locate(&request(temp.path(), flag(*project_type))).unwrap_err();

        assert!(
            matches!(
                err,
                LocatorError::NotFound {
                    kind: FileKind::Project,
                    ..
                }
            ),
            "{project_type}: {err}"
        );
    }
}

#[test]
fn every_project_file_type_reports_two_matches() {
    for (project_type, _, pair) in PROJECT_FILE_CASES {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "App.sln");
        for file in pair {
            touch(temp.path(), file);
        }

        let err = locate(&request(temp.path(), flag(*project_type))).unwrap_err();

        match err {
            LocatorError::Ambiguous {
                kind, candidates, ..
            } => {
                assert_eq!(kind, FileKind::Project, "{project_type}");
                let expected: Vec<_> = pair.iter().map(|f| temp.path().join(f)).collect();
                assert_eq!(candidates, expected, "{project_type}");
            }
            other => panic!("{project_type}: expected ambiguity, got {other:?}"),
        }
    }
}

#[test]
fn types_without_project_files_never_search() {
    let temp = TempDir::new().unwrap();
    touch(temp.path(), "A/A.csproj");
    touch(temp.path(), "B/B.csproj");
    touch(temp.path(), "a/go.mod");
    touch(temp.path(), "b/go.mod");

    for project_type in ProjectType::ALL
        .into_iter()
        .filter(|t| !t.requirements().project_file)
    {
        let resolved = locate(&request(temp.path(), flag(project_type)))
            .unwrap_or_else(|e| panic!("{project_type}: {e}"));
        assert_eq!(resolved.project_file, None, "{project_type}");
        assert_eq!(resolved.solution_file, None, "{project_type}");
    }
}

#[test]
fn two_solutions_are_ambiguous() {
    let temp = TempDir::new().unwrap();
    touch(temp.path(), "Job/Job.csproj");
    touch(temp.path(), "One.sln");
    touch(temp.path(), "nested/Two.sln");

    let err = locate(&request(temp.path(), flag(ProjectType::DotNetConsole))).unwrap_err();

    match err {
        LocatorError::Ambiguous {
            kind, candidates, ..
        } => {
            assert_eq!(kind, FileKind::Solution);
            assert_eq!(
                candidates,
                vec![temp.path().join("One.sln"), temp.path().join("nested/Two.sln")]
            );
        }
        other => panic!("expected ambiguity, got {other:?}"),
    }
}
