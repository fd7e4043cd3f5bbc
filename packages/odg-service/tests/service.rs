use std::collections::HashMap;

use url::Url;

use odg_domain::SortOrder;
use odg_service::{Error, ViewName, ViewReport};
use odg_testkit::{Reply, StubUpstream, ckan_body, package, stub_service, tagged_package};

fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
	pairs.iter().map(|(key, value)| (key.to_string(), value.to_string())).collect()
}

fn pair(url: &Url, key: &str) -> Option<String> {
	url.query_pairs().find(|(name, _)| name == key).map(|(_, value)| value.into_owned())
}

fn two_packages() -> String {
	ckan_body(
		351,
		vec![package("a", "Hospital beds", &["CSV", "json"]), package("b", "Clinic list", &[])],
	)
}

#[tokio::test]
async fn search_maps_one_upstream_page() {
	let (service, upstream) = stub_service(StubUpstream::new(Reply::Body(two_packages())));
	let result = service
		.search(&params(&[("q", "hospital"), ("page", "2"), ("pageSize", "10")]))
		.await
		.expect("Failed to search.");

	assert_eq!(result.query, "hospital");
	assert_eq!((result.page, result.page_size), (2, 10));
	assert_eq!(result.total, 351);
	assert_eq!(result.total_pages, 36);
	assert_eq!(result.sort, SortOrder::Recent);
	assert_eq!(result.datasets.len(), 2);
	assert_eq!(result.datasets[0].resources[1].format.as_deref(), Some("json"));
	assert_eq!(result.source, "https://catalog.test/api/3/action/package_search");

	let requests = upstream.requests();

	assert_eq!(requests.len(), 1);
	assert_eq!(pair(&requests[0], "rows").as_deref(), Some("10"));
	assert_eq!(pair(&requests[0], "start").as_deref(), Some("10"));
	assert_eq!(pair(&requests[0], "fq").as_deref(), Some("organization:\"hhs-gov\""));
}

#[tokio::test]
async fn invalid_parameters_never_reach_upstream() {
	let (service, upstream) = stub_service(StubUpstream::new(Reply::Body(two_packages())));
	let err = service
		.search(&params(&[("pageSize", "999"), ("sort", "oldest")]))
		.await
		.expect_err("Expected validation to fail.");

	let Error::Validation(err) = err else {
		panic!("Expected a validation error, got {err:?}.");
	};

	assert_eq!(err.field_names(), vec!["pageSize", "sort"]);
	assert!(upstream.requests().is_empty());
}

#[tokio::test]
async fn upstream_status_is_a_transport_error() {
	let (service, _) = stub_service(StubUpstream::new(Reply::Status(500)));
	let err = service.search(&HashMap::new()).await.expect_err("Expected the search to fail.");

	assert!(matches!(err, Error::Transport { .. }), "Unexpected error: {err:?}.");
}

#[tokio::test]
async fn unexpected_payload_is_a_schema_error() {
	let body = r#"{"success":false,"result":{"count":0,"results":[]}}"#;
	let (service, _) = stub_service(StubUpstream::new(Reply::Body(body.to_string())));
	let err = service.search(&HashMap::new()).await.expect_err("Expected the search to fail.");

	let Error::Schema(err) = err else {
		panic!("Expected a schema error, got {err:?}.");
	};

	assert_eq!(err.body, body);
}

#[tokio::test]
async fn format_distribution_reads_the_recent_window() {
	let (service, upstream) = stub_service(StubUpstream::new(Reply::Body(two_packages())));
	let report = service.view(ViewName::FormatDistribution).await.expect("Failed to build view.");

	let ViewReport::Series(view) = report else {
		panic!("Expected a series view.");
	};

	assert_eq!(view.view, ViewName::FormatDistribution);
	assert_eq!(view.datasets, 2);
	assert_eq!(
		view.series.iter().map(|entry| (entry.label.as_str(), entry.count)).collect::<Vec<_>>(),
		vec![("CSV", 1), ("JSON", 1)],
	);

	let requests = upstream.requests();

	assert_eq!(pair(&requests[0], "rows").as_deref(), Some("100"));
	assert_eq!(pair(&requests[0], "sort").as_deref(), Some("metadata_modified desc"));
}

#[tokio::test]
async fn tag_frequency_is_relative_to_the_top_tag() {
	let body = ckan_body(
		3,
		vec![
			tagged_package("a", "A", &["Medicare", "covid"]),
			tagged_package("b", "B", &["medicare"]),
			tagged_package("c", "C", &[" MEDICARE "]),
		],
	);
	let (service, _) = stub_service(StubUpstream::new(Reply::Body(body)));
	let report = service.view(ViewName::TagFrequency).await.expect("Failed to build view.");

	let ViewReport::Series(view) = report else {
		panic!("Expected a series view.");
	};

	assert_eq!(view.series[0].label, "medicare");
	assert_eq!((view.series[0].count, view.series[0].percent), (3, 100));
	assert_eq!((view.series[1].label.as_str(), view.series[1].percent), ("covid", 33));
}

#[tokio::test]
async fn resource_counts_search_health_datasets() {
	let (service, upstream) = stub_service(StubUpstream::new(Reply::Body(two_packages())));
	let report = service.view(ViewName::ResourceCounts).await.expect("Failed to build view.");

	let ViewReport::Series(view) = report else {
		panic!("Expected a series view.");
	};

	assert_eq!(view.series.len(), 5);
	// Zero resources land in the first bucket alongside two in the second.
	assert_eq!(view.series[0].count, 1);
	assert_eq!(view.series[1].count, 1);

	let requests = upstream.requests();

	assert_eq!(pair(&requests[0], "q").as_deref(), Some("health"));
	assert_eq!(pair(&requests[0], "rows").as_deref(), Some("50"));
}

#[tokio::test]
async fn search_comparison_orders_terms_by_total() {
	let stub = StubUpstream::new(Reply::Body(ckan_body(0, Vec::new())))
		.route("hospital", Reply::Body(ckan_body(50, Vec::new())))
		.route("medicare", Reply::Body(ckan_body(120, Vec::new())));
	let (service, upstream) = stub_service(stub);
	let report = service.view(ViewName::SearchComparison).await.expect("Failed to build view.");

	let ViewReport::Comparison(view) = report else {
		panic!("Expected a comparison view.");
	};

	assert_eq!(view.terms.len(), 6);
	assert_eq!((view.terms[0].term.as_str(), view.terms[0].percent), ("medicare", 100));
	assert_eq!((view.terms[1].term.as_str(), view.terms[1].percent), ("hospital", 42));
	assert_eq!(view.terms[2].term, "vaccine");

	let requests = upstream.requests();

	assert_eq!(requests.len(), 6);
	assert!(requests.iter().all(|url| pair(url, "rows").as_deref() == Some("1")));
	assert!(
		requests
			.iter()
			.all(|url| pair(url, "sort").as_deref() == Some("score desc, metadata_modified desc"))
	);
}

#[tokio::test]
async fn one_failed_term_fails_the_whole_comparison() {
	let stub = StubUpstream::new(Reply::Body(ckan_body(10, Vec::new())))
		.route("vaccine", Reply::Status(503));
	let (service, _) = stub_service(stub);
	let err = service.view(ViewName::SearchComparison).await.expect_err("Expected the view to fail.");

	assert!(matches!(err, Error::Transport { .. }), "Unexpected error: {err:?}.");
}

#[tokio::test]
async fn panicked_search_task_fails_the_view() {
	let stub = StubUpstream::new(Reply::Body(ckan_body(10, Vec::new())))
		.route("medicare", Reply::Panic);
	let (service, _) = stub_service(stub);
	let err = service.view(ViewName::FormatByTopic).await.expect_err("Expected the view to fail.");

	assert!(matches!(err, Error::Task { .. }), "Unexpected error: {err:?}.");
}

#[tokio::test]
async fn format_by_topic_keeps_topic_order() {
	let body = ckan_body(2, vec![package("a", "A", &["csv", "CSV"]), package("b", "B", &["pdf"])]);
	let (service, _) = stub_service(StubUpstream::new(Reply::Body(body)));
	let report = service.view(ViewName::FormatByTopic).await.expect("Failed to build view.");

	let ViewReport::Topics(view) = report else {
		panic!("Expected a topic view.");
	};

	assert_eq!(
		view.topics.iter().map(|topic| topic.topic.as_str()).collect::<Vec<_>>(),
		vec!["hospital", "medicare", "vaccine"],
	);

	let hospital = &view.topics[0];

	assert_eq!(hospital.total_resources, 3);
	assert_eq!((hospital.formats[0].label.as_str(), hospital.formats[0].percent), ("CSV", 67));
	assert_eq!((hospital.formats[1].label.as_str(), hospital.formats[1].percent), ("PDF", 33));
}

#[tokio::test]
async fn update_timeline_groups_by_month() {
	let (service, _) = stub_service(StubUpstream::new(Reply::Body(two_packages())));
	let report = service.view(ViewName::UpdateTimeline).await.expect("Failed to build view.");

	let ViewReport::Series(view) = report else {
		panic!("Expected a series view.");
	};

	assert_eq!(view.series.len(), 1);
	assert_eq!((view.series[0].label.as_str(), view.series[0].count), ("2024-03", 2));
}
