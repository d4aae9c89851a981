/// A message as it sits in the full-text index
#[derive(Debug, Clone)]
pub struct IndexedMessage {
    /// Account owning the mailbox
    pub owner_id: String,

    /// Mailbox the message is filed in
    pub mailbox_id: String,

    /// Conversation the message belongs to
    pub thread_id: String,

    /// Unique identifier for the message
    pub message_id: String,

    /// Email subject
    pub subject: String,

    /// Sender address or display name
    pub sender: String,

    /// Plain-text body
    pub body: String,
}

impl IndexedMessage {
    pub fn new(
        owner_id: impl Into<String>,
        mailbox_id: impl Into<String>,
        thread_id: impl Into<String>,
        message_id: impl Into<String>,
        subject: impl Into<String>,
        sender: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            owner_id: owner_id.into(),
            mailbox_id: mailbox_id.into(),
            thread_id: thread_id.into(),
            message_id: message_id.into(),
            subject: subject.into(),
            sender: sender.into(),
            body: body.into(),
        }
    }

    /// Indexed text fields, in column order
    pub fn text_fields(&self) -> [&str; 3] {
        [&self.subject, &self.sender, &self.body]
    }
}
