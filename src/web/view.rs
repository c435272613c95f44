//! View-data aggregation
//!
//! A shop render needs up to three independent lookups: the item
//! collection, an optional featured item by id, and the category list for
//! navigation. The aggregator issues them concurrently, waits for all of
//! them, and folds the outcomes into one `ViewData`. Each lookup is
//! failure-isolated: a failed read leaves its fallback message behind
//! instead of taking the whole response down.

use serde::Serialize;

use crate::models::{CatalogItem, Category};
use crate::services::{CatalogService, CategoryService};

/// Fallback message for a failed or empty lookup
pub const NO_RESULTS: &str = "no results";

/// Message shown when the listing comes back empty
pub const TRY_ANOTHER: &str = "Please try another item / category";

/// Per-request render payload for the shop views.
///
/// Built fresh per request, handed to the template, then discarded.
#[derive(Debug, Default, Serialize)]
pub struct ViewData {
    /// Item collection, sorted by publish date descending
    pub items: Vec<CatalogItem>,
    /// Featured item: the requested one, or the newest from `items`
    pub item: Option<CatalogItem>,
    /// Categories for the navigation sidebar
    pub categories: Vec<Category>,
    /// Fallback message when the item lookups failed
    pub items_message: Option<String>,
    /// Fallback message when the category lookup failed
    pub categories_message: Option<String>,
}

/// Sort items by publish date, newest first.
///
/// The sort is stable: items sharing a date keep their fetch order.
pub fn sort_by_post_date_desc(items: &mut [CatalogItem]) {
    items.sort_by(|a, b| b.post_date.cmp(&a.post_date));
}

/// Build the render payload for a shop listing.
///
/// `category_filter` restricts the collection to one category's published
/// items; `featured_id` switches the featured slot to an independent
/// by-id lookup instead of the newest list entry. All lookups run
/// concurrently and are awaited before anything is returned.
pub async fn build_shop_view(
    catalog: &CatalogService,
    categories: &CategoryService,
    category_filter: Option<&str>,
    featured_id: Option<i64>,
) -> ViewData {
    let items_lookup = async {
        match category_filter {
            Some(name) => catalog.published_by_category(name).await,
            None => catalog.published().await,
        }
    };
    let featured_lookup = async {
        match featured_id {
            Some(id) => Some(catalog.get(id).await),
            None => None,
        }
    };
    let categories_lookup = categories.list();

    let (items_result, featured_result, categories_result) =
        futures::join!(items_lookup, featured_lookup, categories_lookup);

    let mut view = ViewData::default();

    match items_result {
        Ok(mut items) => {
            sort_by_post_date_desc(&mut items);
            view.items = items;
        }
        Err(e) => {
            tracing::warn!("Item lookup failed: {}", e);
            view.items_message = Some(NO_RESULTS.to_string());
        }
    }

    match featured_result {
        Some(Ok(item)) => view.item = Some(item),
        Some(Err(e)) => {
            tracing::warn!("Featured item lookup failed: {}", e);
            view.items_message = Some(NO_RESULTS.to_string());
        }
        None => view.item = view.items.first().cloned(),
    }

    match categories_result {
        Ok(list) => view.categories = list,
        Err(e) => {
            tracing::warn!("Category lookup failed: {}", e);
            view.categories_message = Some(NO_RESULTS.to_string());
        }
    }

    view
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{
        CategoryRepository, ItemRepository, SqlxCategoryRepository, SqlxItemRepository,
    };
    use crate::db::{create_test_pool, migrations};
    use crate::models::CreateItemInput;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::Arc;

    struct FailingItemRepo;

    #[async_trait]
    impl ItemRepository for FailingItemRepo {
        async fn create(&self, _input: &CreateItemInput) -> anyhow::Result<CatalogItem> {
            Err(anyhow!("items table unavailable"))
        }
        async fn get_by_id(&self, _id: i64) -> anyhow::Result<Option<CatalogItem>> {
            Err(anyhow!("items table unavailable"))
        }
        async fn list_all(&self) -> anyhow::Result<Vec<CatalogItem>> {
            Err(anyhow!("items table unavailable"))
        }
        async fn list_published(&self) -> anyhow::Result<Vec<CatalogItem>> {
            Err(anyhow!("items table unavailable"))
        }
        async fn list_published_by_category(
            &self,
            _category: &str,
        ) -> anyhow::Result<Vec<CatalogItem>> {
            Err(anyhow!("items table unavailable"))
        }
        async fn list_by_min_date(&self, _min: NaiveDate) -> anyhow::Result<Vec<CatalogItem>> {
            Err(anyhow!("items table unavailable"))
        }
        async fn delete(&self, _id: i64) -> anyhow::Result<u64> {
            Err(anyhow!("items table unavailable"))
        }
    }

    struct FailingCategoryRepo;

    #[async_trait]
    impl CategoryRepository for FailingCategoryRepo {
        async fn create(&self, _name: &str) -> anyhow::Result<Category> {
            Err(anyhow!("categories table unavailable"))
        }
        async fn list(&self) -> anyhow::Result<Vec<Category>> {
            Err(anyhow!("categories table unavailable"))
        }
        async fn get_by_id(&self, _id: i64) -> anyhow::Result<Option<Category>> {
            Err(anyhow!("categories table unavailable"))
        }
        async fn delete(&self, _id: i64) -> anyhow::Result<u64> {
            Err(anyhow!("categories table unavailable"))
        }
    }

    async fn seeded_services() -> (CatalogService, CategoryService) {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();

        let catalog = CatalogService::new(SqlxItemRepository::shared(pool.clone()));
        let categories = CategoryService::new(SqlxCategoryRepository::shared(pool));

        for (title, category, date, published) in [
            ("Old lamp", "home", "2023-05-01", true),
            ("Hammer", "tools", "2024-02-01", true),
            ("Kettle", "home", "2024-02-01", true),
            ("Drill", "tools", "2024-06-01", true),
            ("Hidden draft", "tools", "2024-07-01", false),
        ] {
            catalog
                .add(CreateItemInput {
                    title: title.to_string(),
                    body: String::new(),
                    post_date: date.parse().unwrap(),
                    category: category.to_string(),
                    feature_image: "http://assets.example/x.png".to_string(),
                    published,
                })
                .await
                .unwrap();
        }
        categories.add("home").await.unwrap();
        categories.add("tools").await.unwrap();

        (catalog, categories)
    }

    fn titles(view: &ViewData) -> Vec<&str> {
        view.items.iter().map(|i| i.title.as_str()).collect()
    }

    #[tokio::test]
    async fn test_items_sorted_by_date_desc_with_stable_ties() {
        let (catalog, categories) = seeded_services().await;
        let view = build_shop_view(&catalog, &categories, None, None).await;

        // Hammer and Kettle share a date; fetch order (insertion) decides
        assert_eq!(titles(&view), vec!["Drill", "Hammer", "Kettle", "Old lamp"]);
        assert!(view.items_message.is_none());
    }

    #[tokio::test]
    async fn test_featured_defaults_to_newest_item() {
        let (catalog, categories) = seeded_services().await;
        let view = build_shop_view(&catalog, &categories, None, None).await;

        assert_eq!(view.item.unwrap().title, "Drill");
    }

    #[tokio::test]
    async fn test_category_filter_restricts_items() {
        let (catalog, categories) = seeded_services().await;
        let view = build_shop_view(&catalog, &categories, Some("tools"), None).await;

        assert_eq!(titles(&view), vec!["Drill", "Hammer"]);
    }

    #[tokio::test]
    async fn test_featured_by_id_is_independent_of_listing() {
        let (catalog, categories) = seeded_services().await;
        let all = catalog.all_items().await.unwrap();
        let old_lamp = all.iter().find(|i| i.title == "Old lamp").unwrap();

        // Featured item comes from the by-id lookup even with a filter that
        // excludes it from the collection
        let view =
            build_shop_view(&catalog, &categories, Some("tools"), Some(old_lamp.id)).await;
        assert_eq!(view.item.as_ref().unwrap().title, "Old lamp");
        assert_eq!(titles(&view), vec!["Drill", "Hammer"]);
    }

    #[tokio::test]
    async fn test_failed_featured_lookup_keeps_item_collection() {
        let (catalog, categories) = seeded_services().await;
        let view = build_shop_view(&catalog, &categories, None, Some(9999)).await;

        assert!(view.item.is_none());
        assert_eq!(view.items_message.as_deref(), Some(NO_RESULTS));
        // Step-1 items survive the failed by-id lookup
        assert_eq!(view.items.len(), 4);
    }

    #[tokio::test]
    async fn test_category_failure_leaves_items_intact() {
        let (catalog, _) = seeded_services().await;
        let failing = CategoryService::new(Arc::new(FailingCategoryRepo));

        let view = build_shop_view(&catalog, &failing, None, None).await;
        assert_eq!(view.items.len(), 4);
        assert!(view.items_message.is_none());
        assert_eq!(view.categories_message.as_deref(), Some(NO_RESULTS));
        assert!(view.categories.is_empty());
    }

    #[tokio::test]
    async fn test_item_failure_leaves_categories_intact() {
        let (_, categories) = seeded_services().await;
        let failing = CatalogService::new(Arc::new(FailingItemRepo));

        let view = build_shop_view(&failing, &categories, None, None).await;
        assert!(view.items.is_empty());
        assert_eq!(view.items_message.as_deref(), Some(NO_RESULTS));
        assert_eq!(view.categories.len(), 2);
        assert!(view.categories_message.is_none());
    }
}
