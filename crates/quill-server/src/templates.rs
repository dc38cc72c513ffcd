//! HTML pages.
//!
//! Every page is a pure function from data to a `String`. User-controlled
//! text goes through `html-escape`; document names in URLs are
//! percent-encoded.

use std::fmt::Write as _;

use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};
use quill_core::session::{Flash, FlashKind};

use crate::session::CurrentSession;

const STYLE: &str = "body{font-family:sans-serif;max-width:48rem;margin:2rem auto;padding:0 1rem}\
.flash{padding:.5rem 1rem;border-radius:4px}.success{background:#e6f4ea}.error{background:#fce8e6}\
ul.documents li{margin:.25rem 0}form.inline{display:inline}textarea{width:100%;height:20rem}";

/// Path of a document, percent-encoded.
pub(crate) fn href(name: &str) -> String {
    format!("/{}", urlencoding::encode(name))
}

fn flash_html(flash: &Flash) -> String {
    let class = match flash.kind {
        FlashKind::Success => "success",
        FlashKind::Error => "error",
    };
    format!(
        "<p class=\"flash {class}\">{}</p>\n",
        text(&flash.message)
    )
}

fn user_bar(current: &CurrentSession) -> String {
    match current.session.username() {
        Some(username) => format!(
            "<p>Signed in as {}. \
             <form class=\"inline\" method=\"post\" action=\"/users/signout\">\
             <button type=\"submit\">Sign Out</button></form></p>\n",
            text(username)
        ),
        None => "<p><a href=\"/users/signin\">Sign In</a> or <a href=\"/users/signup\">Sign Up</a></p>\n"
            .to_owned(),
    }
}

fn error_html(error: Option<&str>) -> String {
    error.map_or_else(String::new, |message| {
        format!("<p class=\"flash error\">{}</p>\n", text(message))
    })
}

/// Wrap a body in the shared page layout.
#[must_use]
pub fn layout(title: &str, current: &CurrentSession, body: &str) -> String {
    let mut page = String::with_capacity(body.len() + 1024);
    page.push_str("<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    let _ = writeln!(page, "<title>{}</title>", text(title));
    let _ = writeln!(page, "<style>{STYLE}</style>");
    page.push_str("</head>\n<body>\n");
    if let Some(flash) = &current.flash {
        page.push_str(&flash_html(flash));
    }
    page.push_str(body);
    page.push_str("</body>\n</html>\n");
    page
}

/// The document listing.
#[must_use]
pub fn index(current: &CurrentSession, files: &[String]) -> String {
    let mut body = String::from("<ul class=\"documents\">\n");
    for name in files {
        let link = href(name);
        let _ = writeln!(
            body,
            "<li><a href=\"{link_attr}\">{name_text}</a> \
             <a href=\"{link_attr}/edit\">edit</a> \
             <a href=\"{link_attr}/rename\">rename</a> \
             <form class=\"inline\" method=\"post\" action=\"{link_attr}/duplicate\">\
             <button type=\"submit\">duplicate</button></form> \
             <form class=\"inline\" method=\"post\" action=\"{link_attr}/delete\">\
             <button type=\"submit\">delete</button></form></li>",
            link_attr = attr(&link),
            name_text = text(name),
        );
    }
    body.push_str("</ul>\n<p><a href=\"/new\">New Document</a></p>\n");
    body.push_str(&user_bar(current));
    layout("Documents", current, &body)
}

/// A rendered markdown document.
#[must_use]
pub fn document(current: &CurrentSession, name: &str, html: &str) -> String {
    let body = format!(
        "<article>\n{html}</article>\n<p><a href=\"/\">Back</a></p>\n"
    );
    layout(name, current, &body)
}

/// The edit form of an existing document.
#[must_use]
pub fn edit(current: &CurrentSession, name: &str, content: &str) -> String {
    let body = format!(
        "<p>Edit content of {name_text}:</p>\n\
         <form method=\"post\" action=\"{action}\">\n\
         <textarea name=\"content\">{content_text}</textarea>\n\
         <button type=\"submit\">Save Changes</button>\n\
         </form>\n",
        name_text = text(name),
        action = attr(&href(name)),
        content_text = text(content),
    );
    layout(&format!("Edit {name}"), current, &body)
}

/// The create form.
#[must_use]
pub fn new_document(current: &CurrentSession, filename: &str, error: Option<&str>) -> String {
    let body = format!(
        "{error}<form method=\"post\" action=\"/create\">\n\
         <label for=\"filename\">Add a new document:</label>\n\
         <input name=\"filename\" id=\"filename\" value=\"{value}\">\n\
         <button type=\"submit\">Create</button>\n\
         </form>\n",
        error = error_html(error),
        value = attr(filename),
    );
    layout("New Document", current, &body)
}

/// The rename form.
#[must_use]
pub fn rename(current: &CurrentSession, name: &str, new_name: &str, error: Option<&str>) -> String {
    let body = format!(
        "{error}<form method=\"post\" action=\"{action}/rename\">\n\
         <label for=\"new_name\">Rename {name_text} to:</label>\n\
         <input name=\"new_name\" id=\"new_name\" value=\"{value}\">\n\
         <button type=\"submit\">Rename</button>\n\
         </form>\n",
        error = error_html(error),
        action = attr(&href(name)),
        name_text = text(name),
        value = attr(new_name),
    );
    layout(&format!("Rename {name}"), current, &body)
}

fn credentials_form(action: &str, username: &str, confirm: bool, button: &str) -> String {
    let mut form = format!(
        "<form method=\"post\" action=\"{action}\">\n\
         <label for=\"username\">Username</label>\n\
         <input name=\"username\" id=\"username\" value=\"{value}\">\n\
         <label for=\"password\">Password</label>\n\
         <input type=\"password\" name=\"password\" id=\"password\">\n",
        value = attr(username),
    );
    if confirm {
        form.push_str(
            "<label for=\"confirm_password\">Confirm password</label>\n\
             <input type=\"password\" name=\"confirm_password\" id=\"confirm_password\">\n",
        );
    }
    let _ = write!(form, "<button type=\"submit\">{button}</button>\n</form>\n");
    form
}

/// The sign-up form.
#[must_use]
pub fn signup(current: &CurrentSession, username: &str, error: Option<&str>) -> String {
    let body = format!(
        "{}{}",
        error_html(error),
        credentials_form("/users/signup", username, true, "Sign Up")
    );
    layout("Sign Up", current, &body)
}

/// The sign-in form.
#[must_use]
pub fn signin(current: &CurrentSession, username: &str, error: Option<&str>) -> String {
    let body = format!(
        "{}{}",
        error_html(error),
        credentials_form("/users/signin", username, false, "Sign In")
    );
    layout("Sign In", current, &body)
}
