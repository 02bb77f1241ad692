//! Stack JSON decoding and settings validation against realistic inputs.

use pulltainer_core::{
    EndpointId, EnvPair, Settings, SettingsError, Stack, StackId, StackStatus,
};
use rstest::rstest;

// ---------------------------------------------------------------------------
// 1. Stack decoding
// ---------------------------------------------------------------------------

#[test]
fn decodes_portainer_stack_list() {
    let body = r#"[
        {
            "Id": 3,
            "Name": "traefik",
            "Type": 2,
            "EndpointId": 1,
            "SwarmId": "",
            "EntryPoint": "docker-compose.yml",
            "Env": [{"name": "TZ", "value": "Europe/Berlin"}],
            "Status": 1,
            "Webhook": "0f1c6b5e-3f9d-4a57-9f0a-1e0c2f7b9d11"
        },
        {
            "Id": 4,
            "Name": "old",
            "EndpointId": 2,
            "Env": null,
            "Status": 2
        }
    ]"#;

    let stacks: Vec<Stack> = serde_json::from_str(body).expect("decode");
    assert_eq!(stacks.len(), 2);

    assert_eq!(stacks[0].id, StackId(3));
    assert_eq!(stacks[0].endpoint_id, EndpointId(1));
    assert_eq!(stacks[0].status, StackStatus::Active);
    assert_eq!(stacks[0].env, vec![EnvPair::new("TZ", "Europe/Berlin")]);
    assert_eq!(stacks[0].webhook, "0f1c6b5e-3f9d-4a57-9f0a-1e0c2f7b9d11");

    assert!(stacks[1].env.is_empty(), "null Env decodes as empty");
    assert_eq!(stacks[1].webhook, "", "missing Webhook decodes as empty");
    assert_eq!(stacks[1].status, StackStatus::Inactive);
}

#[test]
fn null_or_missing_env_value_decodes_as_empty() {
    let body = r#"[{
        "Id": 9,
        "Name": "media",
        "EndpointId": 1,
        "Status": 1,
        "Env": [{"name": "PULLTAINER_IGNORE", "value": null}, {"name": "EMPTY"}]
    }]"#;

    let stacks: Vec<Stack> = serde_json::from_str(body).expect("decode");
    assert_eq!(
        stacks[0].env,
        vec![EnvPair::new("PULLTAINER_IGNORE", ""), EnvPair::new("EMPTY", "")]
    );
    assert!(stacks[0].is_ignored());
}

#[test]
fn stack_without_id_fails_to_decode() {
    let body = r#"[{"Name": "broken", "EndpointId": 1, "Status": 1}]"#;
    assert!(serde_json::from_str::<Vec<Stack>>(body).is_err());
}

// ---------------------------------------------------------------------------
// 2. Settings validation
// ---------------------------------------------------------------------------

#[rstest]
#[case("https://portainer.example.com")]
#[case("http://10.0.0.5:9000/")]
#[case("https://example.com/portainer/")]
fn accepts_http_base_urls(#[case] url: &str) {
    let settings = Settings::new(url, "ptr_key").expect("valid url");
    assert!(settings.base_url.as_str().starts_with("http"));
}

#[rstest]
#[case("")]
#[case("   ")]
#[case("portainer.local")]
#[case("ftp://portainer.local")]
#[case("mailto:ops@example.com")]
fn rejects_bad_base_urls(#[case] url: &str) {
    let err = Settings::new(url, "ptr_key").unwrap_err();
    assert!(matches!(err, SettingsError::InvalidUrl { .. }), "got: {err}");
}

#[test]
fn rejects_blank_api_key() {
    let err = Settings::new("https://portainer.local", " ").unwrap_err();
    assert_eq!(err, SettingsError::MissingApiKey);
    assert!(err.to_string().contains("PULLTAINER_API_KEY"));
}
