use crate::model::{Employee, Field};
use crate::query::{
    filter, paginate, sort, total_pages, FuzzyMatcher, PageState, SortDirection, SortState,
    ViewState,
};

fn emp(id: &str, city: Option<&str>) -> Employee {
    Employee {
        hiring_test_id: Some(id.to_string()),
        city: city.map(str::to_string),
        ..Default::default()
    }
}

fn ids(records: &[Employee]) -> Vec<&str> {
    records
        .iter()
        .map(|e| e.hiring_test_id.as_deref().unwrap_or("-"))
        .collect()
}

fn staff(count: usize) -> Vec<Employee> {
    (1..=count)
        .map(|i| Employee {
            hiring_test_id: Some(format!("T{i}")),
            first_name: Some(format!("Name{i}")),
            city: Some(if i % 2 == 0 { "Lahore" } else { "Multan" }.to_string()),
            ..Default::default()
        })
        .collect()
}

#[test]
fn empty_query_is_identity() {
    for records in [Vec::new(), staff(1), staff(45)] {
        assert_eq!(filter(&records, ""), records);
        assert_eq!(filter(&records, "   "), records);
    }
}

#[test]
fn same_key_toggles_direction() {
    let once = SortState::default().toggle(Field::City);
    assert_eq!(once.direction, SortDirection::Asc);
    let twice = once.toggle(Field::City);
    assert_eq!(twice.direction, SortDirection::Desc);
    let thrice = twice.toggle(Field::City);
    assert_eq!(thrice.direction, SortDirection::Asc);
    assert_eq!(thrice.toggle(Field::Country).direction, SortDirection::Asc);
}

#[test]
fn sort_is_stable_in_both_directions() {
    let records = staff(10);
    for direction in [SortDirection::Asc, SortDirection::Desc] {
        let sorted = sort(&records, Field::City, direction);
        let lahore: Vec<&str> = ids(&sorted)
            .into_iter()
            .filter(|id| {
                records
                    .iter()
                    .find(|e| e.hiring_test_id.as_deref() == Some(*id))
                    .and_then(|e| e.city.as_deref())
                    == Some("Lahore")
            })
            .collect();
        assert_eq!(lahore, vec!["T2", "T4", "T6", "T8", "T10"]);
    }
}

#[test]
fn nulls_sort_last_both_ways() {
    let records = vec![
        emp("A", None),
        emp("B", Some("Quetta")),
        emp("C", None),
        emp("D", Some("Gilgit")),
    ];
    for direction in [SortDirection::Asc, SortDirection::Desc] {
        let sorted = sort(&records, Field::City, direction);
        let first_null = sorted.iter().position(|e| e.city.is_none()).unwrap();
        assert!(sorted[first_null..].iter().all(|e| e.city.is_none()));
        assert_eq!(first_null, 2);
        // null records keep their input order
        assert_eq!(ids(&sorted[2..]), vec!["A", "C"]);
    }
}

#[test]
fn first_page_is_prefix() {
    let records = staff(7);
    for n in 1..10 {
        let window = paginate(&records, 1, n);
        assert_eq!(window, &records[..n.min(records.len())]);
    }
}

#[test]
fn empty_list_has_one_page() {
    for n in 1..50 {
        assert_eq!(total_pages(0, n), 1);
    }
}

#[test]
fn navigation_stays_in_range() {
    for count in [0usize, 1, 19, 20, 21, 45, 100] {
        let last = total_pages(count, 20);
        let mut page = PageState::new(20);
        for _ in 0..10 {
            page = page.next(count);
            assert!((1..=last).contains(&page.page));
        }
        assert_eq!(page.page, last);
        for _ in 0..10 {
            page = page.previous(count);
            assert!((1..=last).contains(&page.page));
        }
        assert_eq!(page.page, 1);
    }
}

#[test]
fn id_and_city_ordering_scenario() {
    let records = vec![
        emp("T2", Some("Lahore")),
        emp("T10", Some("Karachi")),
        emp("T1", None),
    ];
    let by_id = sort(&records, Field::HiringTestId, SortDirection::Asc);
    assert_eq!(ids(&by_id), vec!["T1", "T2", "T10"]);

    let by_city = sort(&records, Field::City, SortDirection::Asc);
    let cities: Vec<Option<&str>> = by_city.iter().map(|e| e.city.as_deref()).collect();
    assert_eq!(cities, vec![Some("Karachi"), Some("Lahore"), None]);
}

#[test]
fn typo_query_scenario() {
    let records = vec![emp("T2", Some("Lahore")), emp("T10", Some("Karachi"))];
    let hits = filter(&records, "lahor");
    assert_eq!(ids(&hits), vec!["T2"]);
    assert!(filter(&records, "zzz999").is_empty());
}

#[test]
fn forty_five_rows_make_three_pages() {
    let records = staff(45);
    assert_eq!(total_pages(records.len(), 20), 3);
    assert_eq!(paginate(&records, 3, 20).len(), 5);

    let view = ViewState::new(20)
        .go_to_page(3, records.len())
        .render(&records, &FuzzyMatcher::default());
    assert_eq!(view.total_pages, 3);
    assert_eq!(view.rows.len(), 5);
    assert!(!view.has_next());
    assert!(view.has_previous());
}

#[test]
fn pipeline_composes_filter_sort_page() {
    let records = staff(45);
    let view = ViewState::new(20)
        .with_query("Lahore")
        .with_sort(Field::HiringTestId)
        .render(&records, &FuzzyMatcher::default());
    // 22 even ids, sorted descending after one toggle of the default key
    assert_eq!(view.matched, 22);
    assert_eq!(view.total_pages, 2);
    assert_eq!(ids(&view.rows)[..3], ["T44", "T42", "T40"]);
}
