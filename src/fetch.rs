use std::collections::HashMap;

use anyhow::Result;
use futures::stream::{FuturesUnordered, StreamExt};

use crate::api::types::{LessonRecord, Student, StudentRating};
use crate::api::{self, ApiClient};
use crate::ranking::SubjectCatalog;
use crate::warnln;

/// Everything the ranking views need for one (speciality, course) pair
#[derive(Debug, Clone, Default)]
pub struct RosterData {
    pub roster: Vec<Student>,
    pub details: HashMap<String, Vec<LessonRecord>>,
    pub catalog: SubjectCatalog,
}

async fn fetch_one(client: ApiClient, card: String) -> (String, Result<StudentRating>) {
    let result = api::student_rating(&client, &card).await;
    (card, result)
}

/// Fetch per-student detail for a whole roster as a batch of independent
/// requests with bounded concurrency.
///
/// A failed fetch degrades that student to "no marks" (absent from the map)
/// instead of failing the batch; the engine treats absence as zero marks.
pub async fn fetch_all_details(
    client: &ApiClient,
    roster: &[Student],
    max_concurrent: usize,
    verbose: bool,
) -> HashMap<String, Vec<LessonRecord>> {
    let mut details = HashMap::with_capacity(roster.len());
    let mut cards = roster.iter().map(|s| s.student_card_number.clone());

    // Fill the initial window, then feed one new request per completion
    let mut futures = FuturesUnordered::new();
    for _ in 0..max_concurrent.max(1) {
        if let Some(card) = cards.next() {
            futures.push(fetch_one(client.clone(), card));
        }
    }

    while let Some((card, result)) = futures.next().await {
        match result {
            Ok(rating) => {
                details.insert(card, rating.lessons);
            }
            Err(e) => {
                warnln!("Warning: detail fetch failed for {}: {}", card, e);
            }
        }

        if let Some(next) = cards.next() {
            futures.push(fetch_one(client.clone(), next));
        }
    }

    if verbose {
        warnln!(
            "Fetched detail for {}/{} students",
            details.len(),
            roster.len()
        );
    }

    details
}

/// Fetch the roster for a (speciality, course) pair and the detail payloads
/// behind it. A roster failure aborts the view; detail failures degrade to
/// empty marks per student.
pub async fn fetch_roster_data(
    client: &ApiClient,
    speciality_id: i64,
    course: u32,
    max_concurrent: usize,
    verbose: bool,
) -> Result<RosterData> {
    let roster = api::roster(client, speciality_id, course).await?;

    if verbose {
        warnln!("Roster has {} students", roster.len());
    }

    let details = fetch_all_details(client, &roster, max_concurrent, verbose).await;
    let catalog = SubjectCatalog::from_details(&details);

    Ok(RosterData {
        roster,
        details,
        catalog,
    })
}
