use crate::submission::Submission;

pub const SUBJECT_PREFIX: &str = "New Contact Form Submission: ";

/// A fully composed email, ready for a [`crate::mailer::Mailer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

impl OutgoingMail {
    pub fn compose(submission: &Submission, from: &str, to: &str) -> Self {
        OutgoingMail {
            from: from.to_string(),
            to: to.to_string(),
            subject: format!("{SUBJECT_PREFIX}{}", submission.subject),
            html_body: render_html(submission),
        }
    }
}

fn render_html(submission: &Submission) -> String {
    format!(
        "<p>You have a new contact form submission from your website.</p>\n\
         <h3>Contact Details:</h3>\n\
         <ul>\n\
         <li><strong>Name:</strong> {}</li>\n\
         <li><strong>Email:</strong> {}</li>\n\
         <li><strong>Subject:</strong> {}</li>\n\
         </ul>\n\
         <h3>Message:</h3>\n\
         <p>{}</p>\n",
        escape_html(&submission.name),
        escape_html(&submission.email),
        escape_html(&submission.subject),
        escape_html(&submission.message),
    )
}

pub fn escape_html(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            c => escaped.push(c),
        }
    }
    escaped
}
