// tests/index_test.rs
//
// Index parsing and reverse index generation

mod test_utils;

use metawave::config::ColumnLayout;
use metawave::error::{ErrorKind, MetawaveError};
use metawave::index::{
    append_extension, generate_index, IndexHandler, ReverseIndexHandler, DEFAULT_READER,
};
use test_utils::{read_lines, TestCorpus};

#[test]
fn test_reader_round_trips_through_generated_index() {
    let handler = ReverseIndexHandler::new(Some("r_i")).unwrap();
    let m = handler.pattern().captures("reader7_text-001.token").unwrap();
    assert_eq!(m.reader.as_deref(), Some("reader7"));
    // `_` is a literal and `i` takes the rest of the stem, so the id is
    // "text-001" rather than "001"; `r_*-i` isolates the number.
    assert_eq!(m.id, "text-001");

    let line = handler.line("reader7_text-001.token").unwrap();
    assert_eq!(line, "reader7_text-001.token\treader7_text-001.wav\treader7");

    let mut index = IndexHandler::with_layout(ColumnLayout::REVERSE_INDEX);
    index.set_current(&line, 1).unwrap();
    assert_eq!(index.reader(), "reader7");
    assert_eq!(index.token_fid(), "reader7_text-001.token");
    assert_eq!(index.audio_fid(), "reader7_text-001.wav");
}

#[test]
fn test_generated_index_without_reader() {
    let corpus = TestCorpus::new();
    corpus.write_transcript("b_02.txt", "b");
    corpus.write_transcript("a_01.txt", "a");

    let out = corpus.path("line_index.tsv");
    let handler = ReverseIndexHandler::new(None).unwrap().with_audio_extension(".flac");
    generate_index(&corpus.text, &out, &handler).unwrap();

    let lines = read_lines(&out);
    assert_eq!(lines, vec!["a_01.txt\ta_01.flac", "b_02.txt\tb_02.flac"]);

    let mut index = IndexHandler::with_layout(ColumnLayout::REVERSE_INDEX);
    index.set_audio_extension(".flac");
    index.set_current(&lines[0], 1).unwrap();
    assert_eq!(index.reader(), DEFAULT_READER);
    assert_eq!(index.audio_fid(), "a_01.flac");
}

#[test]
fn test_mismatched_filenames_are_reported() {
    let corpus = TestCorpus::new();
    corpus.write_transcript("spk1-utt1.txt", "x");
    corpus.write_transcript("no_dash_here.txt", "y");
    corpus.write_transcript("spk2-utt2.txt", "z");

    let out = corpus.path("line_index.tsv");
    let handler = ReverseIndexHandler::new(Some("r-i")).unwrap();
    let report = generate_index(&corpus.text, &out, &handler).unwrap();

    assert_eq!(report.written, 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].0, "no_dash_here.txt");
    assert!(matches!(
        report.failures[0].1,
        MetawaveError::PatternMismatch { .. }
    ));
    assert_eq!(read_lines(&out).len(), 2);
}

#[test]
fn test_dotfiles_are_reported_not_indexed() {
    let corpus = TestCorpus::new();
    corpus.write_transcript(".hidden", "x");
    corpus.write_transcript("a.token", "a");

    let out = corpus.path("line_index.tsv");
    let handler = ReverseIndexHandler::new(None).unwrap();
    let report = generate_index(&corpus.text, &out, &handler).unwrap();

    assert_eq!(report.written, 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].0, ".hidden");
    assert!(matches!(
        report.failures[0].1,
        MetawaveError::PatternMismatch { .. }
    ));
    assert_eq!(read_lines(&out), vec!["a.token\ta.wav"]);
}

#[test]
fn test_unknown_dataset_is_a_configuration_error() {
    let err = IndexHandler::new(Some("LibriTTS"), None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);

    // Explicit columns make any name acceptable
    let mut handler = IndexHandler::new(Some("LibriTTS"), Some(ColumnLayout::new(1, 0, None))).unwrap();
    handler.set_token_extension(".normalized.txt");
    handler.set_current("utt_1\tutt_1_audio", 1).unwrap();
    assert_eq!(handler.token_fid(), "utt_1.normalized.txt");
    assert_eq!(handler.audio_fid(), "utt_1_audio.wav");
    assert_eq!(handler.reader(), DEFAULT_READER);
}

#[test]
fn test_extension_append_is_idempotent() {
    for id in ["x", "x.wav", "x.wa", "x.wav.wav", "wav", ".wav"] {
        let once = append_extension(id, ".wav");
        assert_eq!(append_extension(&once, ".wav"), once, "id {}", id);
    }
}
