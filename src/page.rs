//! HTML surfaces for the HTTP adapter
//!
//! Templates are compiled once into a `Tera` instance. Validation messages
//! are built only from fixed labels and phrases, so they render unescaped;
//! anything typed by a user goes through autoescaping.

use serde::Serialize;
use tera::{Context, Tera};

use crate::account::NewAccount;
use crate::session::Session;
use crate::validate::ValidationErrors;

const HOME: &str = r#"<!DOCTYPE html>
<html>
<body>
  <h1>Welcome, {{ username }}!</h1>
  <form method="post" action="/users/sign_out">
    <input type="submit" value="Sign out">
  </form>
</body>
</html>
"#;

const SIGN_IN: &str = r#"<!DOCTYPE html>
<html>
<body>
  <h2>Log in</h2>
  <form method="post" action="/users/sign_in">
    <label for="user_email">Email</label>
    <input type="email" id="user_email" name="email" value="{{ email }}">
    <label for="user_password">Password</label>
    <input type="password" id="user_password" name="password">
    <input type="submit" value="Log in">
  </form>
  <a href="/users/sign_up">Sign up</a>
</body>
</html>
"#;

const SIGN_UP: &str = r#"<!DOCTYPE html>
<html>
<body>
  <h2>Sign up</h2>
  {% if errors %}
  <div id="error_explanation">
    <h2>{{ errors | length }} {% if errors | length == 1 %}error{% else %}errors{% endif %} prohibited this user from being saved:</h2>
    <ul>
      {% for message in errors %}<li>{{ message | safe }}</li>
      {% endfor %}
    </ul>
  </div>
  {% endif %}
  <form method="post" action="/users/sign_up">
    <label for="user_email">Email</label>
    <input type="email" id="user_email" name="email" value="{{ email }}">
    <label for="user_username">Username</label>
    <input type="text" id="user_username" name="username" value="{{ username }}">
    <label for="user_password">Password</label>
    <input type="password" id="user_password" name="password">
    <label for="user_password_confirmation">Password confirmation</label>
    <input type="password" id="user_password_confirmation" name="password_confirmation">
    <input type="submit" value="Sign up">
  </form>
  <a href="/users/sign_in">Log in</a>
</body>
</html>
"#;

#[derive(Serialize)]
struct SignUpView<'a> {
    email: &'a str,
    username: &'a str,
    errors: Vec<String>,
}

#[derive(Debug)]
pub struct Pages {
    tera: Tera,
}

impl Pages {
    pub fn new() -> tera::Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            ("home.html", HOME),
            ("sign_in.html", SIGN_IN),
            ("sign_up.html", SIGN_UP),
        ])?;
        Ok(Self { tera })
    }

    /// Landing page: the welcome banner when signed in, the login form otherwise
    pub fn landing(&self, session: &Session) -> tera::Result<String> {
        match session.username() {
            Some(username) => self.home(username),
            None => self.sign_in(""),
        }
    }

    pub fn home(&self, username: &str) -> tera::Result<String> {
        let mut ctx = Context::new();
        ctx.insert("username", username);
        self.tera.render("home.html", &ctx)
    }

    /// Login surface, optionally prefilled with the email just tried
    pub fn sign_in(&self, email: &str) -> tera::Result<String> {
        let mut ctx = Context::new();
        ctx.insert("email", email);
        self.tera.render("sign_in.html", &ctx)
    }

    /// Registration surface; re-renders the submitted inputs with every error
    pub fn sign_up(&self, candidate: &NewAccount, errors: &ValidationErrors) -> tera::Result<String> {
        let view = SignUpView {
            email: &candidate.email,
            username: &candidate.username,
            errors: errors.full_messages(),
        };
        self.tera.render("sign_up.html", &Context::from_serialize(&view)?)
    }
}
