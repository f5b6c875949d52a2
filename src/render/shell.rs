//! Server-side rendering of the client application shell.

use htmlescape::encode_minimal;

use super::{
    theme::{StyleRegistry, Theme},
    RenderResult, Renderer,
};

/// Client-side routes known to the shell.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Page<'a> {
    Home,
    Users,
    Signup,
    Signin,
    Profile(&'a str),
    EditProfile(&'a str),
    Unknown,
}

impl<'a> Page<'a> {
    fn resolve(path: &'a str) -> Self {
        let trimmed = path.trim_end_matches('/');
        let segments: Vec<&str> = trimmed.split('/').skip(1).collect();
        match segments.as_slice() {
            [] | [""] => Page::Home,
            ["users"] => Page::Users,
            ["signup"] => Page::Signup,
            ["signin"] => Page::Signin,
            ["user", "edit", id] if !id.is_empty() => Page::EditProfile(*id),
            ["user", id] if !id.is_empty() => Page::Profile(*id),
            _ => Page::Unknown,
        }
    }

    /// Private pages need a signed-in user, which never exists on the server.
    fn is_private(&self) -> bool {
        matches!(self, Page::EditProfile(_))
    }
}

/// Renders the menu plus the page for a location. Private pages redirect to
/// the sign-in page.
#[derive(Debug, Clone, Default)]
pub struct AppShell;

impl AppShell {
    fn menu(theme: &Theme, styles: &mut StyleRegistry) -> String {
        let p = &theme.palette;
        styles.add(
            "menu",
            format!(
                ".app-bar{{background:{};color:{};display:flex;align-items:center;padding:0 24px;min-height:64px}}\n\
                 .app-bar a{{color:inherit;margin-right:16px}}\n\
                 .app-bar .title{{flex:1;font-size:1.3em}}",
                p.primary.main, p.primary.contrast_text
            ),
        );
        concat!(
            r#"<header class="app-bar">"#,
            r#"<span class="title">Routinely</span>"#,
            r#"<a href="/">Home</a><a href="/users">Users</a>"#,
            r#"<a href="/signup">Sign up</a><a href="/signin">Sign In</a>"#,
            "</header>"
        )
        .to_string()
    }

    fn card(theme: &Theme, styles: &mut StyleRegistry, title: &str, body: &str) -> String {
        let p = &theme.palette;
        styles.add(
            "card",
            format!(
                ".card{{max-width:600px;margin:40px auto;padding:24px;box-shadow:0 1px 3px rgba(0,0,0,.2)}}\n\
                 .card .title{{color:{};margin:0 0 16px}}\n\
                 .card .protected{{color:{}}}",
                p.open_title, p.protected_title
            ),
        );
        format!(
            r#"<section class="card"><h2 class="title">{}</h2>{}</section>"#,
            encode_minimal(title),
            body
        )
    }

    fn form(theme: &Theme, styles: &mut StyleRegistry, action: &str, fields: &[(&str, &str)]) -> String {
        styles.add(
            "form",
            format!(
                ".form input{{display:block;width:100%;margin:8px 0;padding:8px}}\n\
                 .form button{{background:{};color:{};border:0;padding:8px 16px}}",
                theme.palette.secondary.main, theme.palette.secondary.contrast_text
            ),
        );
        let inputs: String = fields
            .iter()
            .map(|(name, kind)| format!(r#"<input name="{name}" type="{kind}" placeholder="{name}">"#))
            .collect();
        format!(r#"<form class="form" data-action="{action}">{inputs}<button type="submit">Submit</button></form>"#)
    }
}

impl Renderer for AppShell {
    fn render(&self, location: &str, theme: &Theme, styles: &mut StyleRegistry) -> RenderResult {
        let path = location.split(['?', '#']).next().unwrap_or("/");
        let page = Page::resolve(path);
        if page.is_private() {
            return RenderResult::Redirect("/signin".to_string());
        }

        let menu = Self::menu(theme, styles);
        let content = match page {
            Page::Home => Self::card(
                theme,
                styles,
                "Home Page",
                "<p>Welcome to Routinely.</p>",
            ),
            Page::Users => Self::card(
                theme,
                styles,
                "All Users",
                r#"<ul class="user-list" data-source="/api/users"></ul>"#,
            ),
            Page::Signup => {
                let form = Self::form(
                    theme,
                    styles,
                    "/api/users",
                    &[("name", "text"), ("email", "email"), ("password", "password")],
                );
                Self::card(theme, styles, "Sign Up", &form)
            }
            Page::Signin => {
                let form = Self::form(
                    theme,
                    styles,
                    "/auth/signin",
                    &[("email", "email"), ("password", "password")],
                );
                Self::card(theme, styles, "Sign In", &form)
            }
            Page::Profile(id) => Self::card(
                theme,
                styles,
                "Profile",
                &format!(
                    r#"<div class="profile" data-user-id="{}"></div>"#,
                    encode_minimal(id)
                ),
            ),
            Page::EditProfile(_) | Page::Unknown => Self::card(
                theme,
                styles,
                "Page not found",
                r#"<p class="not-found">Nothing lives at this address. <a href="/">Go home</a></p>"#,
            ),
        };

        RenderResult::Markup(format!("{menu}{content}"))
    }
}
