use crate::models::Conference;
use crate::store::{Store, StoreResult};
use crate::utils::make_paper_id;

/// Next paper ID for `conference`, `<ACRONYM>-<n>`.
///
/// The number comes from the store's atomic per-conference counter, so
/// concurrent submissions never share an ID. Numbers are not reused when a
/// submission fails after this call.
pub async fn generate_paper_id(store: &dyn Store, conference: &Conference) -> StoreResult<String> {
    let number = store.next_paper_number(conference.id).await?;
    Ok(make_paper_id(&conference.acronym, number))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewConference;
    use crate::store::MemoryStore;
    use crate::utils::paper_number;
    use chrono::NaiveDate;
    use futures::future::join_all;
    use std::collections::HashSet;
    use uuid::Uuid;

    async fn conference(store: &MemoryStore, acronym: &str) -> Conference {
        let day = NaiveDate::from_ymd_opt(2026, 9, 1).unwrap();
        store
            .create_conference(NewConference {
                organizer_id: Uuid::new_v4(),
                title: format!("{acronym} Conference"),
                acronym: acronym.to_string(),
                category: "Conference".into(),
                first_day: day,
                last_day: day,
                submissions_deadline: day,
                venue: None,
                city: None,
                country: None,
                webpage: None,
                primary_area: "Computer Science".into(),
                secondary_area: None,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_first_id_is_one() {
        let store = MemoryStore::new();
        let abc = conference(&store, "ABC").await;
        assert_eq!(generate_paper_id(&store, &abc).await.unwrap(), "ABC-1");
        assert_eq!(generate_paper_id(&store, &abc).await.unwrap(), "ABC-2");
    }

    #[tokio::test]
    async fn test_concurrent_ids_are_distinct() {
        let store = MemoryStore::new();
        let abc = conference(&store, "ABC").await;

        let ids = join_all((0..50).map(|_| generate_paper_id(&store, &abc))).await;
        let ids: Vec<String> = ids.into_iter().map(Result::unwrap).collect();

        let distinct: HashSet<&String> = ids.iter().collect();
        assert_eq!(distinct.len(), 50);

        let mut numbers: Vec<u64> = ids.iter().filter_map(|id| paper_number(id)).collect();
        numbers.sort_unstable();
        assert_eq!(numbers, (1..=50).collect::<Vec<u64>>());
    }

    #[tokio::test]
    async fn test_conferences_count_independently() {
        let store = MemoryStore::new();
        let abc = conference(&store, "ABC").await;
        let xyz = conference(&store, "XYZ").await;

        generate_paper_id(&store, &abc).await.unwrap();
        assert_eq!(generate_paper_id(&store, &xyz).await.unwrap(), "XYZ-1");
    }
}
