use permgate_auth::Ability;
use permgate_demo::{Button, DemoConfig, MappingChoice, Press, render};
use permgate_state::Store;

fn press_and_render(store: &Store, ability: &Ability, config: &DemoConfig, button: Button) -> Vec<String> {
    let changes = store.changes();
    if let Press::Dispatch(transition) = button.press(&config.login) {
        store.dispatch(transition).unwrap();
    }
    changes
        .drain()
        .iter()
        .map(|change| render(&change.state, ability).to_string())
        .collect()
}

#[test]
fn login_then_logout_rerenders_twice() {
    let config = DemoConfig::default();
    let store = Store::create();
    let ability = Ability::attach(&store, config.mapping.build()).unwrap();

    let after_login = press_and_render(&store, &ability, &config, Button::Login);
    assert_eq!(after_login.len(), 1);
    assert!(after_login[0].contains("Welcome, Youssef"));
    assert!(after_login[0].contains("[Add User] [Delete User]"));

    let after_logout = press_and_render(&store, &ability, &config, Button::Logout);
    assert_eq!(after_logout.len(), 1);
    assert!(after_logout[0].starts_with("Welcome, Please Login!"));
    assert!(!after_logout[0].contains("Add User"));
}

#[test]
fn alerts_do_not_touch_the_store() {
    let config = DemoConfig::default();
    let store = Store::create();
    let ability = Ability::attach(&store, config.mapping.build()).unwrap();

    let rendered = press_and_render(&store, &ability, &config, Button::AddUser);

    assert!(rendered.is_empty());
    assert_eq!(store.revision(), 0);
}

#[test]
fn lenient_mapping_with_custom_principal() {
    let config = DemoConfig::from_lookup(|key| match key {
        "PERMGATE_MAPPING" => Some("split-lenient".to_string()),
        "PERMGATE_LOGIN_JSON" => Some(r#"{"name": "Auditor", "permissions": ["delete_users_now"]}"#.to_string()),
        _ => None,
    });
    assert_eq!(config.mapping, MappingChoice::SplitLenient);

    let store = Store::create();
    let ability = Ability::attach(&store, config.mapping.build()).unwrap();
    let rendered = press_and_render(&store, &ability, &config, Button::Login);

    assert!(rendered[0].contains("Welcome, Auditor"));
    assert!(rendered[0].contains("[Delete User]"));
    assert!(!rendered[0].contains("[Add User]"));
}
