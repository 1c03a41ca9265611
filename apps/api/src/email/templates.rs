use crate::email::OutgoingMail;

pub fn verification_email(to: &str, full_name: &str, link: &str) -> OutgoingMail {
    OutgoingMail {
        to: to.to_string(),
        subject: "Verify your Habayta Jobs account".to_string(),
        html_body: format!(
            "<p>Shalom {full_name},</p>\
             <p>Welcome to Habayta Jobs. Please confirm your email address to finish setting up your account:</p>\
             <p><a href=\"{link}\">Verify my email</a></p>\
             <p>This link expires in 24 hours.</p>"
        ),
    }
}

pub fn application_status_email(to: &str, job_title: &str, status: &str) -> OutgoingMail {
    OutgoingMail {
        to: to.to_string(),
        subject: format!("Update on your application: {job_title}"),
        html_body: format!(
            "<p>Your application for <strong>{job_title}</strong> is now <strong>{status}</strong>.</p>\
             <p>Log in to Habayta Jobs to see the details.</p>"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verification_email_contains_link() {
        let mail = verification_email("a@b.co", "Dana", "https://x/verify-email?token=t");
        assert_eq!(mail.to, "a@b.co");
        assert!(mail.html_body.contains("https://x/verify-email?token=t"));
        assert!(mail.html_body.contains("Dana"));
    }

    #[test]
    fn test_status_email_mentions_job_and_status() {
        let mail = application_status_email("a@b.co", "QA Engineer", "interview");
        assert!(mail.subject.contains("QA Engineer"));
        assert!(mail.html_body.contains("interview"));
    }
}
