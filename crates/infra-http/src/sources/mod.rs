mod aggregator_search;
mod curated_csv;
mod repo_listing;

pub use aggregator_search::AggregatorSearchAdapter;
pub use curated_csv::CuratedCsvAdapter;
pub use repo_listing::RepositoryListingAdapter;
