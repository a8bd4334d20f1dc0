//! Trace classification.
//!
//! Sends one conversation turn to the completion backend with a fixed
//! classification prompt, then normalizes the raw answer to exactly one
//! `Category`. A successful-but-unparseable answer falls back to
//! `GeneralInquiry` so ingestion is never blocked by a sloppy model
//! reply; a failed call propagates as an error and nothing is invented.

use crate::completions::{CompletionBackend, CompletionError};
use crate::models::Category;

/// A category name is a couple of tokens; anything longer is prose we
/// would ignore anyway.
const CLASSIFY_MAX_TOKENS: u32 = 10;

/// Classification prompt. The category descriptions and disambiguation
/// rules are part of the taxonomy's definition and the dashboards built
/// on it; do not reword them casually.
const CLASSIFICATION_PROMPT: &str = r#"You are a support ticket classifier. Classify the following customer support conversation into exactly one category.

Categories:
- Billing: Questions about invoices, charges, payment methods, pricing, or subscription fees
- Refund: Requests to return a product, get money back, dispute a charge, or process a credit
- Account Access: Issues logging in, resetting passwords, locked accounts, or MFA problems
- Cancellation: Requests to cancel a subscription, downgrade a plan, or close an account
- General Inquiry: Anything that doesn't fit the above — feature questions, product info, how-to questions, etc.

Classification rules:
1. Identify the PRIMARY intent of the customer message — use that category even if other topics are mentioned
2. Refund vs Billing: if the customer wants money back (not just asking about a charge), use Refund
3. Cancellation vs Billing: if the customer wants to cancel (not just asking about pricing), use Cancellation
4. Account Access vs General Inquiry: if the issue is logging in or authentication, use Account Access
5. When genuinely ambiguous, prefer the more specific category over General Inquiry

Customer Message:
{user_message}

Support Response:
{bot_response}

Respond with ONLY the category name. No explanation, no punctuation — just the exact category name from the list above."#;

/// Render the classification prompt for one conversation turn.
fn render_prompt(user_message: &str, bot_response: &str) -> String {
    CLASSIFICATION_PROMPT
        .replace("{user_message}", user_message)
        .replace("{bot_response}", bot_response)
}

/// Classify one conversation turn into exactly one category.
///
/// The raw answer is trimmed and matched against the canonical names
/// (case-insensitive substring, canonical order, first match wins), so
/// "Refund." or "The category is Refund" still lands on `Refund`. An
/// answer matching no name at all becomes `GeneralInquiry`. Only
/// successful output falls back; a failed call is returned as an error.
pub async fn classify(
    backend: &dyn CompletionBackend,
    user_message: &str,
    bot_response: &str,
) -> Result<Category, CompletionError> {
    let prompt = render_prompt(user_message, bot_response);
    let raw = backend.complete(None, &prompt, CLASSIFY_MAX_TOKENS).await?;
    let answer = raw.trim();

    match Category::matching(answer) {
        Some(category) => Ok(category),
        None => {
            tracing::warn!(answer = %answer, "Unrecognized classifier answer, using General Inquiry");
            Ok(Category::GeneralInquiry)
        }
    }
}
