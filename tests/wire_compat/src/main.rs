fn main() {
    println!("Run `cargo test -p wire-compat` to execute wire compatibility tests.");
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use buildrelay_protocol::{
        ArtifactRole, BuildId, CommitUploadRequest, CommitUploadResponse, InitUploadRequest,
        InitUploadResponse, UploadTarget,
    };

    /// Returns the path to the fixtures directory.
    fn fixtures_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
    }

    /// Loads a fixture JSON file and returns it as a `serde_json::Value`.
    fn load_fixture(name: &str) -> serde_json::Value {
        let path = fixtures_dir().join(name);
        let data = fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()));
        serde_json::from_str(&data)
            .unwrap_or_else(|e| panic!("failed to parse fixture {}: {e}", path.display()))
    }

    /// Deserializes a fixture, re-serializes it and compares the JSON values
    /// (object key order does not matter).
    fn roundtrip_test<T>(name: &str) -> T
    where
        T: serde::de::DeserializeOwned + serde::Serialize,
    {
        let fixture = load_fixture(name);
        let parsed: T = serde_json::from_value(fixture.clone())
            .unwrap_or_else(|e| panic!("failed to deserialize {name}: {e}"));
        let reserialized = serde_json::to_value(&parsed)
            .unwrap_or_else(|e| panic!("failed to re-serialize {name}: {e}"));

        assert_eq!(
            fixture, reserialized,
            "roundtrip mismatch for {name}:\n  fixture: {fixture}\n  Rust:    {reserialized}"
        );
        parsed
    }

    #[test]
    fn fixture_init_upload_request() {
        let req: InitUploadRequest = roundtrip_test("init_upload_request.json");
        assert_eq!(req.channel, "beta");
        assert_eq!(req.files[&ArtifactRole::Primary].size, 187_392_011);
        assert_eq!(
            req.files[&ArtifactRole::DebugSymbols].filename,
            "Telegram.DSYMs.zip"
        );
    }

    #[test]
    fn fixture_init_upload_response() {
        let resp: InitUploadResponse = roundtrip_test("init_upload_response.json");
        assert_eq!(resp.build_id(), Some(BuildId::from("b-20261018-0042")));

        let ipa = resp.target_for(ArtifactRole::Primary).unwrap();
        assert_eq!(ipa.headers["x-upload-signature"], "3f2a9c");

        let dsym = resp.target_for(ArtifactRole::DebugSymbols).unwrap();
        assert!(dsym.headers.is_empty());
    }

    #[test]
    fn fixture_init_response_keys_are_known_roles() {
        let fixture = load_fixture("init_upload_response.json");
        let urls = fixture["upload_urls"].as_object().unwrap();
        for key in urls.keys() {
            assert!(
                ArtifactRole::from_wire_name(key).is_some(),
                "unknown role key {key:?}"
            );
        }
    }

    #[test]
    fn fixture_commit_upload_request() {
        let req: CommitUploadRequest = roundtrip_test("commit_upload_request.json");
        assert_eq!(req.build_id, "b-20261018-0042");
    }

    #[test]
    fn fixture_commit_upload_response() {
        let resp: CommitUploadResponse = roundtrip_test("commit_upload_response.json");
        assert_eq!(
            resp.install_page_url(),
            Some("https://svc.example/install/b-20261018-0042")
        );
    }

    #[test]
    fn fixture_upload_target() {
        let target: UploadTarget = roundtrip_test("upload_target.json");
        assert!(target.url.starts_with("https://uploads.svc.example/"));
    }

    #[test]
    fn init_response_tolerates_extra_fields() {
        let mut fixture = load_fixture("init_upload_response.json");
        fixture["expires_in"] = serde_json::json!(3600);
        let resp: InitUploadResponse = serde_json::from_value(fixture).unwrap();
        assert_eq!(resp.build_id(), Some(BuildId::from("b-20261018-0042")));
    }
}
