//! Text rendition of the gated screen.
//!
//! The screen greets the principal and shows the "Add User" / "Delete User"
//! buttons only when the ability allows them. Login and Logout are always
//! shown.

use permgate_auth::Ability;
use permgate_state::{AuthState, Transition, actions};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    AddUser,
    DeleteUser,
    Login,
    Logout,
}

impl Button {
    pub const ALL: [Button; 4] = [Button::AddUser, Button::DeleteUser, Button::Login, Button::Logout];

    pub fn label(&self) -> &'static str {
        match self {
            Button::AddUser => "Add User",
            Button::DeleteUser => "Delete User",
            Button::Login => "Login",
            Button::Logout => "Logout",
        }
    }

    /// `(action, subject)` a button needs, or `None` if it is always shown.
    pub fn requires(&self) -> Option<(&'static str, &'static str)> {
        match self {
            Button::AddUser => Some(("add", "users")),
            Button::DeleteUser => Some(("delete", "users")),
            Button::Login | Button::Logout => None,
        }
    }

    pub fn press(&self, login: &Transition) -> Press {
        match self {
            Button::AddUser => Press::Alert("User Added!"),
            Button::DeleteUser => Press::Alert("User Deleted!"),
            Button::Login => Press::Dispatch(login.clone()),
            Button::Logout => Press::Dispatch(actions::logout()),
        }
    }
}

impl core::fmt::Display for Button {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

/// What pressing a button does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Press {
    Alert(&'static str),
    Dispatch(Transition),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screen {
    pub greeting: String,
    pub buttons: Vec<Button>,
}

impl Screen {
    pub fn shows(&self, button: Button) -> bool {
        self.buttons.contains(&button)
    }
}

impl core::fmt::Display for Screen {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        writeln!(f, "{}", self.greeting)?;
        let labels: Vec<String> = self.buttons.iter().map(|b| format!("[{}]", b)).collect();
        write!(f, "{}", labels.join(" "))
    }
}

pub fn render(state: &AuthState, ability: &Ability) -> Screen {
    let rules = ability.snapshot();

    let greeting = format!(
        "Welcome, {}",
        state.name.as_deref().unwrap_or("Please Login!")
    );
    let buttons = Button::ALL
        .into_iter()
        .filter(|b| b.requires().is_none_or(|(action, subject)| rules.contains(action, subject)))
        .collect();

    Screen { greeting, buttons }
}

#[cfg(test)]
mod tests {
    use permgate_auth::SplitCodes;
    use permgate_state::Store;

    use super::*;

    #[test]
    fn logged_out_screen_hides_gated_buttons() {
        let store = Store::create();
        let ability = Ability::attach(&store, SplitCodes::strict()).unwrap();

        let screen = render(&store.get_state(), &ability);

        assert_eq!(screen.greeting, "Welcome, Please Login!");
        assert_eq!(screen.buttons, vec![Button::Login, Button::Logout]);
    }

    #[test]
    fn logged_in_screen_shows_granted_buttons() {
        let store = Store::create();
        let ability = Ability::attach(&store, SplitCodes::strict()).unwrap();
        store.dispatch(actions::login()).unwrap();

        let screen = render(&store.get_state(), &ability);

        assert_eq!(screen.greeting, "Welcome, Youssef");
        assert!(screen.shows(Button::AddUser));
        assert!(screen.shows(Button::DeleteUser));
        assert_eq!(
            screen.to_string(),
            "Welcome, Youssef\n[Add User] [Delete User] [Login] [Logout]"
        );
    }

    #[test]
    fn buttons_press_as_expected() {
        let login = actions::login();
        assert_eq!(Button::AddUser.press(&login), Press::Alert("User Added!"));
        assert_eq!(Button::Login.press(&login), Press::Dispatch(login.clone()));
        assert_eq!(Button::Logout.press(&login), Press::Dispatch(Transition::Logout));
    }
}
