use release_pin::github::http_client;
use release_pin::manifest::{self, ProjectReleases};
use release_pin::{
    AssetHasher, AssetPattern, Manifest, ManifestEntry, ProjectSpec, ReleaseClient, Reporter,
    UpdateOptions, Updater,
};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn walrus() -> ProjectSpec {
    ProjectSpec::new(
        "walrus",
        "MystenLabs/walrus",
        AssetPattern::regex(r"walrus-.*-ubuntu-x86_64\.tgz").unwrap(),
    )
}

fn updater(server: &MockServer, force: bool) -> Updater {
    let http = http_client().unwrap();
    Updater::new(
        ReleaseClient::new(http.clone(), &server.uri(), 1),
        AssetHasher::new(http),
        UpdateOptions {
            force,
            max_releases: 10,
        },
    )
}

fn render(changes: &release_pin::ChangeSet, manifest: &Manifest) -> String {
    let mut out = Vec::new();
    Reporter::new(false)
        .report(&mut out, changes, manifest)
        .unwrap();
    String::from_utf8(out).unwrap()
}

#[tokio::test]
async fn new_release_is_pinned_and_reported() {
    let server = MockServer::start().await;
    let url = format!(
        "{}/dl/walrus-mainnet-v1.0.0-ubuntu-x86_64.tgz",
        server.uri()
    );
    Mock::given(method("GET"))
        .and(path("/repos/MystenLabs/walrus/releases"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "tag_name": "mainnet-v1.0.0",
                "assets": [
                    {
                        "name": "walrus-mainnet-v1.0.0-ubuntu-aarch64.tgz",
                        "browser_download_url": format!("{}/dl/other", server.uri())
                    },
                    {
                        "name": "walrus-mainnet-v1.0.0-ubuntu-x86_64.tgz",
                        "browser_download_url": url
                    }
                ]
            }
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/dl/walrus-mainnet-v1.0.0-ubuntu-x86_64.tgz"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"hello world".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("releases.json");

    let loaded = manifest::load(&file).unwrap();
    assert!(loaded.backup.is_none());

    let (updated, changes) = updater(&server, false)
        .run(&[walrus()], &loaded.manifest)
        .await;
    updated.save(&file).unwrap();

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&file).unwrap()).unwrap();
    assert_eq!(
        written,
        json!({
            "walrus": {
                "mainnet-v1.0.0": {
                    "hash": "sha256-uU0nuZNNPgilLlLX2n2r+sSE7+N6U4DukIj3rOLvzek=",
                    "url": url
                }
            }
        })
    );

    let text = render(&changes, &updated);
    assert!(text.contains("walrus:\n  Added:\n    + mainnet-v1.0.0\n"));
    assert!(text.contains("walrus: (1 versions)\n  mainnet: mainnet-v1.0.0\n"));
}

#[tokio::test]
async fn rerun_is_byte_identical() {
    let server = MockServer::start().await;

    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("releases.json");

    let mut walrus_releases = ProjectReleases::new();
    for tag in ["testnet-v1.2.0", "mainnet-v1.1.0", "mainnet-v1.0.0"] {
        walrus_releases.insert(
            tag.to_string(),
            ManifestEntry {
                hash: format!("sha256-{}", tag),
                url: format!("https://example.invalid/{}", tag),
            },
        );
    }
    let mut initial = Manifest::new();
    initial.insert("walrus", walrus_releases);
    initial.save(&file).unwrap();
    let before = std::fs::read_to_string(&file).unwrap();

    let loaded = manifest::load(&file).unwrap();
    let (updated, changes) = updater(&server, false)
        .run(&[walrus()], &loaded.manifest)
        .await;
    updated.save(&file).unwrap();

    assert_eq!(std::fs::read_to_string(&file).unwrap(), before);
    assert_eq!(
        std::fs::read_to_string(manifest::backup_path(&file)).unwrap(),
        before
    );
    assert!(render(&changes, &updated).contains("No changes"));
}
