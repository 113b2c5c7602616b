use permgate_auth::Ability;
use permgate_demo::{Button, DemoConfig, Press, render};
use permgate_state::Store;

/// Button presses the demo session performs, in order.
const SESSION: [Button; 6] = [
    Button::AddUser,
    Button::Login,
    Button::AddUser,
    Button::DeleteUser,
    Button::Logout,
    Button::DeleteUser,
];

fn main() -> anyhow::Result<()> {
    permgate_observability::init();

    let config = DemoConfig::from_env();
    tracing::info!(mapping = ?config.mapping, "starting permgate demo");

    let store = Store::create();
    let ability = Ability::attach(&store, config.mapping.build())?;
    let changes = store.changes();

    let mut screen = render(&store.get_state(), &ability);
    println!("{screen}\n");

    for button in SESSION {
        if !screen.shows(button) {
            tracing::info!(%button, "button not visible");
            continue;
        }

        match button.press(&config.login) {
            Press::Alert(message) => println!("alert: {message}\n"),
            Press::Dispatch(transition) => {
                store.dispatch(transition)?;
                for change in changes.drain() {
                    tracing::info!(revision = change.revision, transition = %change.transition, "re-rendering");
                    screen = render(&change.state, &ability);
                    println!("{screen}\n");
                }
            }
        }
    }

    let decision = ability.explain("add", "users");
    println!("{}", serde_json::to_string_pretty(&decision)?);

    store.dispose();
    Ok(())
}
