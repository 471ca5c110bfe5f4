/// CSS selectors of the Listflex lmadmin pages.
pub struct ListflexSelectors;

impl ListflexSelectors {
    pub const USERNAME_INPUT: &'static str = "input[name='username']";
    pub const PASSWORD_INPUT: &'static str = "input[name='password']";
    pub const LOGIN_BUTTON: &'static str = "button";

    pub const INTEGRATION_BOX: &'static str = ".statusbox";
    pub const INTEGRATION_TITLE: &'static str = "h3";
    pub const EDIT_BUTTON: &'static str = ".btn_pencil";

    pub const SAVE_BUTTON: &'static str = ".submit";
}

pub const LOGIN_PAGE: &str = "login.php";
