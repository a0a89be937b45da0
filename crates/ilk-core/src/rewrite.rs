//! Rewrite pass over one message: extract → verify (concurrently) → substitute.

use std::ops::Range;

use futures::future::join_all;

use crate::{
    domain::Message,
    extract::{extract_issue_keys, link_spans, IssueToken},
    messaging::types::MessageBuilder,
    ports::IssueVerifier,
    settings::TrackerSettings,
    verify::{Verification, VerificationResult},
};

/// Stages of a single rewrite pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RewriteStage {
    Extracted,
    Verifying,
    Rewritten,
}

/// Markdown link to an issue's browse page.
pub fn issue_link(domain: &str, key: &str) -> String {
    format!("[{key}](https://{domain}/browse/{key})")
}

/// Verify every token concurrently. Results keep the order of `tokens`.
pub async fn verify_all(
    tokens: &[IssueToken],
    settings: &TrackerSettings,
    verifier: &dyn IssueVerifier,
) -> Vec<VerificationResult> {
    join_all(
        tokens
            .iter()
            .map(|token| verifier.verify(&token.key, settings)),
    )
    .await
}

/// First occurrence of `token` that stands on its own and is not already linked.
fn next_unlinked_occurrence(text: &str, token: &str) -> Option<Range<usize>> {
    if token.is_empty() {
        return None;
    }
    let spans = link_spans(text);

    text.match_indices(token)
        .map(|(start, m)| start..start + m.len())
        .find(|range| {
            let joined_before = text[..range.start]
                .chars()
                .next_back()
                .is_some_and(|c| c.is_ascii_uppercase());
            let joined_after = text[range.end..]
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_digit());
            let linked = spans
                .iter()
                .any(|span| span.start <= range.start && range.end <= span.end);
            !joined_before && !joined_after && !linked
        })
}

/// Substitute verified tokens with issue links, one occurrence per result.
///
/// Results are consumed in the given order; unverified results leave the text
/// untouched.
pub fn apply_verifications(text: &str, domain: &str, results: &[VerificationResult]) -> String {
    let mut out = text.to_string();

    for result in results {
        let Verification::Verified { key } = &result.outcome else {
            continue;
        };
        match next_unlinked_occurrence(&out, &result.token) {
            Some(range) => out.replace_range(range, &issue_link(domain, key)),
            None => tracing::debug!(token = %result.token, "verified token not found in text"),
        }
    }

    out
}

fn log_failures(results: &[VerificationResult], settings: &TrackerSettings) {
    for result in results {
        if let Verification::Unverified(failure) = &result.outcome {
            tracing::debug!(
                token = %result.token,
                url = %failure.url,
                status = ?failure.status,
                detail = %failure.detail,
                user = %settings.user,
                "issue lookup was unsuccessful"
            );
        }
    }
}

/// Run the full pass over `text`.
pub async fn rewrite_text(
    text: &str,
    settings: &TrackerSettings,
    verifier: &dyn IssueVerifier,
) -> String {
    let tokens = extract_issue_keys(Some(text));
    tracing::debug!(
        stage = ?RewriteStage::Extracted,
        tokens = tokens.len(),
        "found possible issue keys"
    );
    if tokens.is_empty() {
        return text.to_string();
    }

    tracing::debug!(stage = ?RewriteStage::Verifying, "looking up issue keys");
    let results = verify_all(&tokens, settings, verifier).await;
    log_failures(&results, settings);

    let out = apply_verifications(text, &settings.domain, &results);
    tracing::debug!(
        stage = ?RewriteStage::Rewritten,
        linked = results.iter().filter(|r| r.key().is_some()).count(),
        "rewrote message text"
    );
    out
}

/// Rewrite `message` into `builder` and return the builder's staged message.
///
/// A message without text or id is left as is.
pub async fn rewrite_message(
    message: &Message,
    builder: &mut MessageBuilder,
    settings: &TrackerSettings,
    verifier: &dyn IssueVerifier,
) -> Message {
    tracing::debug!(
        id = ?message.id,
        sender = %message.sender.id.0,
        room = %message.room.0,
        "processing message"
    );

    let (Some(text), Some(_)) = (message.text.as_deref(), message.id.as_ref()) else {
        return builder.message().clone();
    };

    let rewritten = rewrite_text(text, settings, verifier).await;
    builder.set_text(rewritten);
    builder.message().clone()
}
