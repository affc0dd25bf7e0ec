use super::*;

fn catalog(files: &[&str], order: &[&str]) -> Catalog {
    Catalog::new(CatalogData {
        root: "videos/tripleS/".to_string(),
        member_order: order.iter().map(|s| s.to_string()).collect(),
        collections: vec![CollectionData {
            name: "C".to_string(),
            files: files.iter().map(|s| s.to_string()).collect(),
        }],
    })
    .unwrap()
}

#[test]
fn builtin_catalog_resolves_chaewon() {
    let c = Catalog::builtin().unwrap();
    let names: Vec<_> = c.collection_names().collect();
    assert_eq!(names, ["Binary02 501z", "Binary02 502z"]);

    let e = c.find_clip("Binary02 501z", "Chaewon").unwrap();
    assert_eq!(
        e.locator,
        "videos/tripleS/Binary02 501z/binary02-chaewon-501z.mp4"
    );
    assert_eq!(e.file_name, "binary02-chaewon-501z.mp4");
}

#[test]
fn builtin_catalog_follows_member_order() {
    let c = Catalog::builtin().unwrap();
    let clips = c.clips("Binary02 502z").unwrap();
    assert_eq!(clips.len(), 24);
    assert_eq!(clips[0].display_name, "Seoyeon");
    assert_eq!(clips[1].display_name, "Hyerin");
    assert_eq!(clips[23].display_name, "Jiyeon");
}

#[test]
fn unranked_clips_sort_after_ranked_alphabetically() {
    let c = catalog(
        &["x-zed-1.mp4", "x-bravo-1.mp4", "x-hyerin-1.mp4", "x-Alpha-1.mp4", "x-seoyeon-1.mp4"],
        &["seoyeon", "hyerin"],
    );
    let names: Vec<_> = c
        .clips("C")
        .unwrap()
        .into_iter()
        .map(|e| e.display_name)
        .collect();
    assert_eq!(names, ["Seoyeon", "Hyerin", "Alpha", "Bravo", "Zed"]);
}

#[test]
fn display_name_falls_back_to_file_name() {
    assert_eq!(display_name("binary02-chaewon-501z.mp4"), "Chaewon");
    assert_eq!(display_name("plainclip.mp4"), "plainclip.mp4");
    assert_eq!(display_name("a--b.mp4"), "a--b.mp4");
}

#[test]
fn locator_trims_trailing_slash() {
    let c = catalog(&["x-lynn-1.mp4"], &[]);
    assert_eq!(c.clips("C").unwrap()[0].locator, "videos/tripleS/C/x-lynn-1.mp4");
}

#[test]
fn unknown_collection_has_no_clips() {
    let c = Catalog::builtin().unwrap();
    assert!(c.clips("Nope").is_none());
    assert!(!c.has_collection("Nope"));
}

#[test]
fn duplicate_collections_are_rejected() {
    let data = CatalogData {
        root: "r".to_string(),
        member_order: Vec::new(),
        collections: vec![
            CollectionData {
                name: "A".to_string(),
                files: Vec::new(),
            },
            CollectionData {
                name: "A".to_string(),
                files: Vec::new(),
            },
        ],
    };
    assert!(Catalog::new(data).is_err());
    assert!(Catalog::from_json("{").is_err());
}
