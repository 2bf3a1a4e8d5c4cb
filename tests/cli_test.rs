//! CLI integration tests for gql-shape binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("gql-shape"))
}

// Helper to create a temp manifest file
fn write_temp_file(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

const USERS: &str = r#"{
    "definitions": {
        "Role": { "type": "enum", "values": ["ADMIN", "USER"] },
        "User": {
            "type": "object",
            "description": "A registered account",
            "properties": {
                "id": { "type": "string", "format": "uuid" },
                "role": { "$ref": "Role" },
                "profile": {
                    "type": "object",
                    "properties": {
                        "bio": { "type": "string", "optional": true },
                        "links": { "type": "array", "items": { "type": "string", "format": "url" } }
                    }
                }
            }
        }
    },
    "registrations": [
        { "kind": "enum", "name": "Role", "schema": { "$ref": "Role" } },
        { "kind": "object", "name": "User", "schema": { "$ref": "User" } },
        {
            "kind": "input",
            "name": "UserFilterInput",
            "schema": {
                "type": "object",
                "properties": {
                    "role": { "$ref": "Role", "default": "USER" },
                    "limit": { "type": "number", "int": true, "default": 20 }
                }
            }
        }
    ]
}"#;

mod render_command {
    use super::*;

    #[test]
    fn renders_sdl() {
        let dir = TempDir::new().unwrap();
        let manifest = write_temp_file(&dir, "users.json", USERS);

        cmd()
            .args(["render", manifest.to_str().unwrap()])
            .assert()
            .success()
            .stdout(predicate::str::contains("scalar UUID"))
            .stdout(predicate::str::contains("enum Role {"))
            .stdout(predicate::str::contains("type UserProfile {"))
            .stdout(predicate::str::contains("\"\"\"A registered account\"\"\""))
            .stdout(predicate::str::contains("  profile: UserProfile!"))
            .stdout(predicate::str::contains("  bio: String\n"))
            .stdout(predicate::str::contains("input UserFilterInput {"))
            .stdout(predicate::str::contains("  role: Role! = USER"))
            .stdout(predicate::str::contains("  limit: Int! = 20"));
    }

    #[test]
    fn renders_json_summary() {
        let dir = TempDir::new().unwrap();
        let manifest = write_temp_file(&dir, "users.json", USERS);

        let output = cmd()
            .args(["render", manifest.to_str().unwrap(), "--format", "json"])
            .output()
            .unwrap();
        assert!(output.status.success());

        let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        let names: Vec<&str> = summary["types"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, ["UserProfile", "User", "UserFilterInput"]);
        assert_eq!(summary["enums"][0]["name"], "Role");
    }

    #[test]
    fn writes_output_file() {
        let dir = TempDir::new().unwrap();
        let manifest = write_temp_file(&dir, "users.json", USERS);
        let output = dir.path().join("schema.graphql");

        cmd()
            .args([
                "render",
                manifest.to_str().unwrap(),
                "--output",
                output.to_str().unwrap(),
            ])
            .assert()
            .success()
            .stdout(predicate::str::is_empty());

        let content = fs::read_to_string(&output).unwrap();
        assert!(content.contains("type User {"));
    }

    #[test]
    fn unregistered_enum_exits_2() {
        let dir = TempDir::new().unwrap();
        let manifest = write_temp_file(
            &dir,
            "bad.json",
            r#"{
                "registrations": [{
                    "kind": "object",
                    "name": "User",
                    "schema": {
                        "type": "object",
                        "properties": { "role": { "type": "enum", "values": ["A"] } }
                    }
                }]
            }"#,
        );

        cmd()
            .args(["render", manifest.to_str().unwrap()])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("registering \"User\""))
            .stderr(predicate::str::contains("\"role\""));
    }

    #[test]
    fn tuple_member_exits_2() {
        let dir = TempDir::new().unwrap();
        let manifest = write_temp_file(
            &dir,
            "tuple.json",
            r#"{
                "registrations": [{
                    "kind": "object",
                    "name": "Point",
                    "schema": {
                        "type": "object",
                        "properties": {
                            "coords": { "type": "tuple", "elements": [{ "type": "number" }] }
                        }
                    }
                }]
            }"#,
        );

        cmd()
            .args(["render", manifest.to_str().unwrap()])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("\"coords\""));
    }

    #[test]
    fn duplicate_names_exit_2() {
        let dir = TempDir::new().unwrap();
        let manifest = write_temp_file(
            &dir,
            "dup.json",
            r#"{
                "registrations": [
                    { "kind": "object", "name": "Thing", "schema": { "type": "object", "properties": { "id": { "type": "string" } } } },
                    { "kind": "input", "name": "Thing", "schema": { "type": "object", "properties": { "id": { "type": "string" } } } }
                ]
            }"#,
        );

        cmd()
            .args(["render", manifest.to_str().unwrap()])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("declared more than once"));
    }

    #[test]
    fn missing_file_exits_3() {
        cmd()
            .args(["render", "/nonexistent/manifest.json"])
            .assert()
            .code(3)
            .stderr(predicate::str::contains("file not found"));
    }

    #[test]
    fn invalid_json_exits_1() {
        let dir = TempDir::new().unwrap();
        let manifest = write_temp_file(&dir, "broken.json", "{ not json");

        cmd()
            .args(["render", manifest.to_str().unwrap()])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("invalid JSON"));
    }

    #[test]
    fn loads_manifest_from_url() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/users.json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(USERS)
            .create();

        cmd()
            .args(["render", &format!("{}/users.json", server.url())])
            .assert()
            .success()
            .stdout(predicate::str::contains("type User {"));

        mock.assert();
    }

    #[test]
    fn url_error_status_exits_3() {
        let mut server = mockito::Server::new();
        let mock = server.mock("GET", "/missing.json").with_status(404).create();

        cmd()
            .args(["render", &format!("{}/missing.json", server.url())])
            .assert()
            .code(3)
            .stderr(predicate::str::contains("failed to fetch"));

        mock.assert();
    }
}

mod check_command {
    use super::*;

    #[test]
    fn valid_manifest() {
        let dir = TempDir::new().unwrap();
        let manifest = write_temp_file(&dir, "users.json", USERS);

        cmd()
            .args(["check", manifest.to_str().unwrap()])
            .assert()
            .success()
            .stdout(predicate::str::contains("Valid (3 registrations)"));
    }

    #[test]
    fn valid_manifest_json() {
        let dir = TempDir::new().unwrap();
        let manifest = write_temp_file(&dir, "users.json", USERS);

        let output = cmd()
            .args(["check", manifest.to_str().unwrap(), "--json"])
            .output()
            .unwrap();
        assert!(output.status.success());

        let result: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(result["valid"], true);
        assert_eq!(result["registered"][1]["kind"], "object");
        assert_eq!(result["registered"][1]["name"], "User");
    }

    #[test]
    fn schema_violations_json() {
        let dir = TempDir::new().unwrap();
        let manifest = write_temp_file(
            &dir,
            "bad.json",
            r#"{ "registrations": [{ "kind": "object", "name": "User", "schema": { "type": "varchar" } }] }"#,
        );

        let output = cmd()
            .args(["check", manifest.to_str().unwrap(), "--json"])
            .output()
            .unwrap();
        assert_eq!(output.status.code(), Some(1));

        let result: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(result["valid"], false);
        assert!(!result["issues"].as_array().unwrap().is_empty());
    }

    #[test]
    fn unknown_reference() {
        let dir = TempDir::new().unwrap();
        let manifest = write_temp_file(
            &dir,
            "ref.json",
            r#"{ "registrations": [{ "kind": "object", "name": "User", "schema": { "$ref": "Nope" } }] }"#,
        );

        cmd()
            .args(["check", manifest.to_str().unwrap()])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("unknown definition \"Nope\""));
    }

    #[test]
    fn error_json_has_message() {
        let dir = TempDir::new().unwrap();
        let manifest = write_temp_file(
            &dir,
            "union.json",
            r#"{
                "registrations": [{
                    "kind": "union",
                    "name": "Pet",
                    "schema": {
                        "type": "union",
                        "options": [{ "type": "object", "properties": { "a": { "type": "string" } } }]
                    }
                }]
            }"#,
        );

        let output = cmd()
            .args(["check", manifest.to_str().unwrap(), "--json"])
            .output()
            .unwrap();
        assert_eq!(output.status.code(), Some(2));

        let result: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(result["valid"], false);
        assert!(result["error"]
            .as_str()
            .unwrap()
            .contains("no registered object type"));
    }
}

mod verbosity {
    use super::*;

    #[test]
    fn debug_logs_go_to_stderr() {
        let dir = TempDir::new().unwrap();
        let manifest = write_temp_file(&dir, "users.json", USERS);

        cmd()
            .args(["-vv", "render", manifest.to_str().unwrap()])
            .assert()
            .success()
            .stdout(predicate::str::contains("type User {"))
            .stdout(predicate::str::contains("DEBUG").not())
            .stderr(predicate::str::contains("generated type"));
    }
}
