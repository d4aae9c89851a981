//! Demo corpus, loaded when SEED_DEMO_DATA is enabled

use anyhow::Result;
use tracing::info;
use uuid::Uuid;

use crate::storage::{models::IndexedMessage, IndexWriter};

/// Owner every demo message belongs to
pub const DEMO_OWNER: &str = "demo";

/// (mailbox, subject, sender, body), grouped by thread
const DEMO_THREADS: &[&[(&str, &str, &str, &str)]] = &[
    &[
        (
            "inbox",
            "Invoice #1042 for October",
            "billing@acme.test",
            "Hi, please find attached invoice #1042. Payment is due within 30 days.",
        ),
        (
            "inbox",
            "Re: Invoice #1042 for October",
            "demo@mail.test",
            "Thanks, the invoice has been forwarded to accounts payable.",
        ),
    ],
    &[(
        "archive",
        "Invoice #0987 for September",
        "billing@acme.test",
        "Your September invoice is attached. This invoice has been paid in full.",
    )],
    &[(
        "receipts",
        "Your receipt from Corner Coffee",
        "no-reply@cornercoffee.test",
        "Receipt for one flat white and a croissant. Thank you for your order.",
    )],
    &[
        (
            "inbox",
            "Team offsite planning",
            "alex@team.test",
            "Let's pick a date for the offsite. The venue needs a deposit by Friday.",
        ),
        (
            "archive",
            "Re: Team offsite planning",
            "sam@team.test",
            "Friday works. I'll send the deposit receipt once it's paid.",
        ),
    ],
    &[(
        "inbox",
        "Weekly newsletter",
        "news@updates.test",
        "This week: release notes, travel tips, and a reminder to file your expenses.",
    )],
];

/// Index the demo corpus unless the demo owner already has messages.
/// Returns the number of messages written.
pub async fn seed_demo_data(writer: &dyn IndexWriter) -> Result<usize> {
    let existing = writer.count_for_owner(DEMO_OWNER).await?;
    if existing > 0 {
        info!(
            "Demo data already present ({} messages for '{}'), skipping seed",
            existing, DEMO_OWNER
        );
        return Ok(0);
    }

    let mut written = 0;
    for thread in DEMO_THREADS {
        let thread_id = Uuid::new_v4().to_string();
        for (mailbox, subject, sender, body) in thread.iter() {
            writer
                .index_message(IndexedMessage::new(
                    DEMO_OWNER,
                    *mailbox,
                    thread_id.clone(),
                    Uuid::new_v4().to_string(),
                    *subject,
                    *sender,
                    *body,
                ))
                .await?;
            written += 1;
        }
    }

    info!("Seeded {} demo messages for owner '{}'", written, DEMO_OWNER);
    Ok(written)
}
