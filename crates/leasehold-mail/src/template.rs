//! Invitation email template and signup link construction.

use leasehold_core::dispatch::EmailMessage;
use url::Url;

/// Build the signup link carrying the raw invitation token.
///
/// `path` is appended to whatever path `base_url` already has, so a portal
/// mounted under `https://host/portal` yields
/// `https://host/portal/tenant-signup`.
pub fn signup_link(
    base_url: &str,
    path: &str,
    token_param: &str,
    token: &str,
) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(base_url)?;
    url.set_query(None);
    url.set_fragment(None);
    url.path_segments_mut()
        .map_err(|()| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
        .pop_if_empty()
        .extend(path.split('/').filter(|segment| !segment.is_empty()));
    url.query_pairs_mut().append_pair(token_param, token);
    Ok(url)
}

/// Content of the tenant invitation email.
#[derive(Debug, Clone)]
pub struct InvitationEmail<'a> {
    pub tenant_name: &'a str,
    pub signup_link: &'a Url,
    pub expires_in_days: i64,
}

impl InvitationEmail<'_> {
    pub fn render(&self, to: &str, subject: &str) -> EmailMessage {
        let name = escape_html(self.tenant_name.trim());
        let greeting = if name.is_empty() {
            "Hello,".to_string()
        } else {
            format!("Hello {name},")
        };
        let link = escape_html(self.signup_link.as_str());
        let html = format!(
            "<!DOCTYPE html>\
             <html><body style=\"font-family: sans-serif; color: #1f2937;\">\
             <p>{greeting}</p>\
             <p>Your property manager has invited you to the tenant portal, where \
             you can submit maintenance requests, make payments and send messages.</p>\
             <p><a href=\"{link}\" style=\"display: inline-block; padding: 10px 16px; \
             background: #2563eb; color: #ffffff; text-decoration: none; \
             border-radius: 4px;\">Create your account</a></p>\
             <p>If the button does not work, copy this link into your browser:<br>{link}</p>\
             <p>This invitation expires in {days} days.</p>\
             </body></html>",
            days = self.expires_in_days,
        );

        EmailMessage {
            to: to.to_string(),
            subject: subject.to_string(),
            html,
        }
    }
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_carries_token_query_parameter() {
        let url = signup_link("https://app.example.com", "/tenant-signup", "token", "abc123").unwrap();
        assert_eq!(url.as_str(), "https://app.example.com/tenant-signup?token=abc123");
    }

    #[test]
    fn link_encodes_token() {
        let url = signup_link("https://app.example.com/", "tenant-signup", "token", "a b&c").unwrap();
        let token = url
            .query_pairs()
            .find(|(k, _)| k == "token")
            .map(|(_, v)| v.into_owned());
        assert_eq!(token.as_deref(), Some("a b&c"));
    }

    #[test]
    fn link_keeps_base_path() {
        let nested = signup_link("https://host/portal", "/tenant-signup", "token", "abc").unwrap();
        assert_eq!(nested.as_str(), "https://host/portal/tenant-signup?token=abc");

        let trailing = signup_link("https://host/portal/", "/tenant-signup", "token", "abc").unwrap();
        assert_eq!(trailing.as_str(), "https://host/portal/tenant-signup?token=abc");
    }

    #[test]
    fn cannot_be_a_base_url_is_rejected() {
        assert!(signup_link("mailto:jane@x.com", "/tenant-signup", "token", "abc").is_err());
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        assert!(signup_link("not a url", "/tenant-signup", "token", "abc").is_err());
    }

    #[test]
    fn rendered_email_contains_link_and_escaped_name() {
        let link = signup_link("https://app.example.com", "/tenant-signup", "token", "abc123").unwrap();
        let message = InvitationEmail {
            tenant_name: "Jane <Doe>",
            signup_link: &link,
            expires_in_days: 7,
        }
        .render("jane@x.com", "You're invited");

        assert_eq!(message.to, "jane@x.com");
        assert_eq!(message.subject, "You're invited");
        assert!(message.html.contains("Hello Jane &lt;Doe&gt;,"));
        assert!(message.html.contains("https://app.example.com/tenant-signup?token=abc123"));
        assert!(message.html.contains("expires in 7 days"));
    }

    #[test]
    fn blank_name_uses_generic_greeting() {
        let link = signup_link("https://app.example.com", "/s", "token", "t").unwrap();
        let message = InvitationEmail {
            tenant_name: "  ",
            signup_link: &link,
            expires_in_days: 7,
        }
        .render("jane@x.com", "Invite");
        assert!(message.html.contains("<p>Hello,</p>"));
    }
}
