use super::*;

#[test]
fn empty_chunks_are_dropped() {
    let mut b = MediaBuffer::new();
    assert!(!b.push(Vec::new()));
    assert!(b.push(vec![1, 2]));
    assert_eq!(b.len(), 1);
    assert_eq!(b.total_bytes(), 2);
}

#[test]
fn concat_preserves_emission_order() {
    let mut b = MediaBuffer::new();
    b.push(vec![1]);
    b.push(vec![2, 3]);
    b.push(vec![4]);
    assert_eq!(b.concat(), vec![1, 2, 3, 4]);
    b.clear();
    assert!(b.is_empty());
    assert_eq!(b.total_bytes(), 0);
    assert!(b.concat().is_empty());
}

#[test]
fn recorded_file_derives_extension() {
    let f = RecordedFile::new("video/webm;codecs=vp8,opus", vec![0; 3]);
    assert_eq!(f.extension, "webm");
    assert_eq!(f.len(), 3);
}
