use super::*;
use crate::diagnostics::DiagnosticKind;
use crate::document::*;
use crate::options::CompileOptions;

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {} but got {}",
        expected,
        actual
    );
}

fn assert_elapsed(metadata: &[PlaybackMetadata], expected: &[f64]) {
    assert_eq!(metadata.len(), expected.len(), "metadata: {:?}", metadata);
    for (entry, expected) in metadata.iter().zip(expected) {
        assert_close(entry.elapsed_seconds, *expected);
    }
}

fn quarters(count: usize) -> Vec<Column> {
    (0..count)
        .map(|i| Column::new(format!("c{}", i), "quarter"))
        .collect()
}

fn strums(count: usize) -> Vec<Strum> {
    (0..count).map(|_| Strum::new("v")).collect()
}

fn single_section(subsections: Vec<Subsection>) -> TabDocument {
    TabDocument::new(vec![Section::new("s1", "Verse", subsections)])
}

fn compile_once(document: &TabDocument) -> Compilation {
    expand_full_tab(
        document,
        &[ProgressionEntry::new("s1", 1)],
        &CompileOptions::default(),
    )
}

/// Every entry except the trailing boundary.
fn real_entries(compiled: &Compilation) -> &[PlaybackMetadata] {
    &compiled.metadata[..compiled.metadata.len() - 1]
}

#[test]
fn test_four_quarter_notes() {
    let tab = TabSubsection::new("t1", quarters(4));
    let document = single_section(vec![Subsection::from(tab).with_bpm(120.0)]);

    let compiled = compile_once(&document);

    assert_elapsed(&compiled.metadata, &[0.0, 0.5, 1.0, 1.5, 3.5]);
    assert!(compiled.metadata[..4].iter().all(|m| m.bpm == 120.0));
    assert!(compiled.metadata[..4].iter().all(|m| m.note_length_multiplier == "1"));
    assert!(compiled.diagnostics.is_empty());
}

#[test]
fn test_subsection_repetitions() {
    let tab = TabSubsection::new("t1", quarters(4));
    let document = single_section(vec![Subsection::from(tab).with_bpm(120.0).with_repetitions(2)]);

    let compiled = compile_once(&document);

    assert_elapsed(
        real_entries(&compiled),
        &[0.0, 0.5, 1.0, 1.5, 2.0, 2.5, 3.0, 3.5],
    );

    // Both passes point back at the same columns
    assert_eq!(compiled.metadata[1].location, compiled.metadata[5].location);

    // Each pass is its own subsection in the expanded tree
    let section = &compiled.sections[0];
    assert_eq!(section.subsections.len(), 2);
    match (&section.subsections[0], &section.subsections[1]) {
        (PlaybackSubsection::Tab(first), PlaybackSubsection::Tab(second)) => {
            assert_eq!(first.indices, vec![0, 1, 2, 3]);
            assert_eq!(second.indices, vec![4, 5, 6, 7]);
        }
        other => panic!("expected two tab passes, got {:?}", other),
    }
}

#[test]
fn test_zero_repetitions_play_once() {
    let mut tab = TabSubsection::new("t1", quarters(2));
    tab.repetitions = 0;
    let document = single_section(vec![tab.into()]);

    let compiled = compile_once(&document);
    assert_eq!(compiled.playable_count(), 2);
}

#[test]
fn test_eighth_note_strums() {
    let pattern = StrummingPattern::new("p1", "eighth", strums(4));
    let sequence = ChordSequence::new("q1", pattern, vec!["G".into(), "".into(), "C".into(), "".into()]);
    let chords = ChordSubsection::new("ch1", vec![sequence]);
    let document = single_section(vec![Subsection::from(chords).with_bpm(100.0)]);

    let compiled = compile_once(&document);

    assert_elapsed(real_entries(&compiled), &[0.0, 0.3, 0.6, 0.9]);
    assert!(real_entries(&compiled).iter().all(|m| m.note_length_multiplier == "0.5"));
    assert_eq!(compiled.metadata[2].location, Location::strum(0, 0, 0, 2));
}

#[test]
fn test_chord_sequence_inherits_subsection_tempo() {
    let pattern = StrummingPattern::new("p1", "quarter", strums(3));
    let sequence = ChordSequence::new("q1", pattern, vec![]);
    let chords = ChordSubsection::new("ch1", vec![sequence]);
    let document = single_section(vec![Subsection::from(chords).with_bpm(120.0)]).with_bpm(80.0);

    let compiled = compile_once(&document);

    assert!(real_entries(&compiled).iter().all(|m| m.bpm == 120.0));
}

#[test]
fn test_chord_sequence_tempo_override() {
    let slow = ChordSequence::new("slow", StrummingPattern::new("p1", "quarter", strums(2)), vec![]).with_bpm(60.0);
    let plain = ChordSequence::new("plain", StrummingPattern::new("p2", "quarter", strums(2)), vec![]);
    let chords = ChordSubsection::new("ch1", vec![slow, plain]);
    let document = single_section(vec![Subsection::from(chords).with_bpm(120.0)]);

    let compiled = compile_once(&document);
    let bpms: Vec<f64> = real_entries(&compiled).iter().map(|m| m.bpm).collect();

    // The override does not leak into the next sequence
    assert_eq!(bpms, vec![60.0, 60.0, 120.0, 120.0]);
    assert_elapsed(real_entries(&compiled), &[0.0, 1.0, 2.0, 2.5]);
}

#[test]
fn test_subsection_without_tempo_uses_document_tempo() {
    let tab = TabSubsection::new("t1", quarters(1));
    let document = single_section(vec![tab.into()]).with_bpm(90.0);

    let compiled = compile_once(&document);
    assert_eq!(compiled.metadata[0].bpm, 90.0);

    let document = single_section(vec![TabSubsection::new("t1", quarters(1)).into()]);
    let compiled = compile_once(&document);
    assert_eq!(compiled.metadata[0].bpm, CompileOptions::DEFAULT_BPM);
}

#[test]
fn test_unusable_default_tempo_falls_back() {
    let document = single_section(vec![TabSubsection::new("t1", quarters(3)).into()]);

    for bpm in [0.0, -30.0, f64::NAN, f64::INFINITY] {
        let options = CompileOptions::default().with_default_bpm(bpm);
        let compiled = expand_full_tab(&document, &[ProgressionEntry::new("s1", 1)], &options);

        assert!(compiled.metadata.iter().all(|m| m.bpm == CompileOptions::DEFAULT_BPM));
        assert_elapsed(&compiled.metadata, &[0.0, 0.5, 1.0, 3.0]);
    }
}

#[test]
fn test_measure_line_tempo_change_and_reset() {
    let columns = vec![
        Column::new("a", "quarter"),
        Column::measure_line("m1", Some(60.0)),
        Column::new("b", "quarter"),
        Column::measure_line("m2", Some(240.0)),
        Column::new("c", "quarter"),
        Column::measure_line("m3", None),
        Column::new("d", "quarter"),
    ];
    let tab = TabSubsection::new("t1", columns);
    let document = single_section(vec![Subsection::from(tab).with_bpm(120.0)]);

    let compiled = compile_once(&document);
    let entries = real_entries(&compiled);
    let bpms: Vec<f64> = entries.iter().map(|m| m.bpm).collect();

    // The reset goes back to the subsection's 120, not to the 60 before 240
    assert_eq!(bpms, vec![120.0, 60.0, 60.0, 240.0, 240.0, 120.0, 120.0]);
    assert_elapsed(entries, &[0.0, 0.5, 0.5, 1.5, 1.5, 1.75, 1.75]);
}

#[test]
fn test_measure_lines_take_no_index() {
    let columns = vec![
        Column::measure_line("m0", None),
        Column::new("a", "eighth"),
        Column::new("b", "eighth"),
        Column::measure_line("m1", None),
        Column::new("c", "quarter"),
    ];
    let tab = TabSubsection::new("t1", columns);
    let document = single_section(vec![Subsection::from(tab).with_bpm(120.0)]);

    let compiled = compile_once(&document);

    match &compiled.sections[0].subsections[0] {
        PlaybackSubsection::Tab(tab) => {
            assert_eq!(tab.indices, vec![0, 1, 2]);
            assert_eq!(tab.columns.len(), 5);
        }
        other => panic!("expected a tab pass, got {:?}", other),
    }

    // Measure lines are still on the timeline
    let entries = real_entries(&compiled);
    assert_eq!(entries.len(), 5);
    assert_eq!(entries[0].note_length_multiplier, "0");
    assert_eq!(entries[0].playback_index, None);
    assert_eq!(entries[3].location, Location::column(0, 0, 3));
    let indices: Vec<Option<usize>> = entries.iter().map(|m| m.playback_index).collect();
    assert_eq!(indices, vec![None, Some(0), Some(1), None, Some(2)]);
}

#[test]
fn test_triplet_timing() {
    let columns = (0..3)
        .map(|i| Column::new(format!("t{}", i), "eighthTriplet"))
        .collect();
    let tab = TabSubsection::new("t1", columns);
    let document = single_section(vec![Subsection::from(tab).with_bpm(60.0)]);

    let compiled = compile_once(&document);
    let entries = real_entries(&compiled);

    assert_close(entries[1].elapsed_seconds, 0.3333);
    assert_close(entries[2].elapsed_seconds, 0.6666);
    assert_eq!(entries[0].note_length_multiplier, "0.3333");
}

#[test]
fn test_progression_repetitions_and_order() {
    let intro = Section::new("intro", "Intro", vec![Subsection::from(TabSubsection::new("t1", quarters(2))).with_bpm(120.0)]);
    let verse = Section::new("verse", "Verse", vec![Subsection::from(TabSubsection::new("t2", quarters(1))).with_bpm(60.0)]);
    let document = TabDocument::new(vec![intro, verse]);
    let progression = vec![
        ProgressionEntry::new("verse", 1),
        ProgressionEntry::new("intro", 2),
    ];

    let compiled = expand_full_tab(&document, &progression, &CompileOptions::default());

    let titles: Vec<&str> = compiled.sections.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["Verse", "Intro", "Intro"]);

    let entries = real_entries(&compiled);
    assert_elapsed(entries, &[0.0, 1.0, 1.5, 2.0, 2.5]);
    assert_eq!(entries[0].location.section_index, 1);
    assert_eq!(entries[1].location.section_index, 0);

    let indices: Vec<usize> = entries.iter().filter_map(|m| m.playback_index).collect();
    assert_eq!(indices, vec![0, 1, 2, 3, 4]);
}

#[test]
fn test_missing_progression_section_is_skipped() {
    let document = single_section(vec![TabSubsection::new("t1", quarters(2)).into()]);
    let progression = vec![
        ProgressionEntry::new("ghost", 3),
        ProgressionEntry::new("s1", 1),
    ];

    let compiled = expand_full_tab(&document, &progression, &CompileOptions::default());

    assert_eq!(compiled.sections.len(), 1);
    assert_eq!(compiled.playable_count(), 2);
    assert_eq!(compiled.diagnostics.len(), 1);
    assert_eq!(compiled.diagnostics[0].kind, DiagnosticKind::UnresolvedSection);
}

#[test]
fn test_terminal_boundary() {
    let pattern = StrummingPattern::new("p1", "sixteenth", strums(2));
    let chords = ChordSubsection::new("ch1", vec![ChordSequence::new("q1", pattern, vec![])]);
    let document = single_section(vec![Subsection::from(chords).with_bpm(45.0)]);

    let compiled = compile_once(&document);
    let last = &compiled.metadata[1];
    let boundary = compiled.metadata.last().unwrap();

    assert_eq!(compiled.metadata.len(), 3);
    assert_eq!(boundary.location, Location::strum(0, 0, 0, 2));
    assert_eq!(boundary.location, last.location.next_chord());
    assert_eq!(boundary.bpm, last.bpm);
    assert_eq!(boundary.note_length_multiplier, last.note_length_multiplier);
    assert_eq!(boundary.playback_index, None);
    // 60 / 45 = 1.33 rounds up to 2, plus one second of margin
    assert_close(boundary.elapsed_seconds, last.elapsed_seconds + 3.0);
}

#[test]
fn test_empty_tab_has_no_boundary() {
    let document = TabDocument::new(vec![Section::new("s1", "Empty", vec![])]);
    let compiled = compile_once(&document);
    assert!(compiled.is_empty());
    assert_eq!(compiled.sections.len(), 1);
    assert_eq!(compiled.duration_seconds(), 0.0);
}

#[test]
fn test_unknown_note_length_plays_as_quarter() {
    let tab = TabSubsection::new("t1", vec![Column::new("a", "whole"), Column::new("b", "quarter")]);
    let document = single_section(vec![Subsection::from(tab).with_bpm(120.0).with_repetitions(3)]);

    let compiled = compile_once(&document);

    assert_eq!(compiled.metadata[0].note_length_multiplier, "1");
    assert_close(compiled.metadata[1].elapsed_seconds, 0.5);
    // Reported once even though the column plays three times
    assert_eq!(compiled.diagnostics.len(), 1);
    assert_eq!(compiled.diagnostics[0].kind, DiagnosticKind::UnknownNoteLength);
    assert_eq!(compiled.diagnostics[0].location, Some(Location::column(0, 0, 0)));
}

#[test]
fn test_timeline_is_monotonic() {
    let chords = ChordSubsection::new(
        "ch1",
        vec![
            ChordSequence::new("q1", StrummingPattern::new("p1", "quarterTriplet", strums(3)), vec![]).with_repetitions(2),
            ChordSequence::new("q2", StrummingPattern::new("p2", "sixteenthTriplet", strums(6)), vec![]).with_bpm(75.0),
        ],
    );
    let tab = TabSubsection::new(
        "t1",
        vec![
            Column::new("a", "sixteenth"),
            Column::measure_line("m1", Some(200.0)),
            Column::new("b", "eighthTriplet"),
            Column::measure_line("m2", None),
            Column::new("c", "quarter"),
        ],
    );
    let document = single_section(vec![
        Subsection::from(chords).with_repetitions(2),
        Subsection::from(tab).with_bpm(90.0).with_repetitions(2),
    ]);

    let compiled = compile_once(&document);
    let metadata = &compiled.metadata;

    assert_eq!(metadata[0].elapsed_seconds, 0.0);
    for pair in metadata.windows(2) {
        assert!(pair[0].elapsed_seconds <= pair[1].elapsed_seconds);
    }

    let playable: Vec<&PlaybackMetadata> = metadata.iter().filter(|m| m.is_playable()).collect();
    for pair in playable.windows(2) {
        assert!(pair[0].elapsed_seconds < pair[1].elapsed_seconds);
        assert_eq!(pair[0].playback_index.unwrap() + 1, pair[1].playback_index.unwrap());
    }
    assert_eq!(playable.len(), 2 * (2 * 3 + 6) + 2 * 3);
}

#[test]
fn test_preview_section() {
    let document = TabDocument::new(vec![
        Section::new("intro", "Intro", vec![Subsection::from(TabSubsection::new("t1", quarters(3))).with_bpm(120.0)]),
        Section::new(
            "verse",
            "Verse",
            vec![
                Subsection::from(TabSubsection::new("t2", quarters(2))).with_bpm(60.0),
                Subsection::from(TabSubsection::new("t3", quarters(1))).with_bpm(60.0).with_repetitions(2),
            ],
        ),
    ]);

    let preview = expand_specific_chord_grouping(&document, &GroupingLocation::section(1), &CompileOptions::default());

    assert_eq!(preview.sections.len(), 1);
    assert_eq!(preview.sections[0].id, "verse");
    assert_eq!(preview.sections[0].subsections.len(), 3);
    // Starts from zero, no boundary entry
    assert_elapsed(&preview.metadata, &[0.0, 1.0, 2.0, 3.0]);
    assert_eq!(preview.metadata[0].location.section_index, 1);
    assert_eq!(preview.metadata[0].playback_index, Some(0));
}

#[test]
fn test_preview_subsection_keeps_its_repetitions() {
    let document = single_section(vec![
        Subsection::from(TabSubsection::new("t1", quarters(4))).with_bpm(120.0),
        Subsection::from(TabSubsection::new("t2", quarters(2))).with_bpm(120.0).with_repetitions(3),
    ]);

    let preview = expand_specific_chord_grouping(&document, &GroupingLocation::subsection(0, 1), &CompileOptions::default());

    assert_eq!(preview.sections[0].subsections.len(), 3);
    assert_elapsed(&preview.metadata, &[0.0, 0.5, 1.0, 1.5, 2.0, 2.5]);
    assert!(preview.metadata.iter().all(|m| m.location.subsection_index == 1));
}

#[test]
fn test_preview_chord_sequence() {
    let sequences = vec![
        ChordSequence::new("q1", StrummingPattern::new("p1", "quarter", strums(4)), vec![]),
        ChordSequence::new("q2", StrummingPattern::new("p2", "eighth", strums(2)), vec!["D".into(), "".into()]).with_repetitions(2),
    ];
    let document = single_section(vec![Subsection::from(ChordSubsection::new("ch1", sequences)).with_bpm(120.0)]);

    let preview = expand_specific_chord_grouping(
        &document,
        &GroupingLocation::chord_sequence(0, 0, 1),
        &CompileOptions::default(),
    );

    assert_elapsed(&preview.metadata, &[0.0, 0.25, 0.5, 0.75]);
    assert!(preview.metadata.iter().all(|m| m.bpm == 120.0));
    assert_eq!(preview.metadata[3].location, Location::strum(0, 0, 1, 1));

    match &preview.sections[0].subsections[..] {
        [PlaybackSubsection::Chord(chord)] => {
            assert_eq!(chord.id, "ch1");
            assert_eq!(chord.sequences.len(), 2);
            assert_eq!(chord.sequences[1].indices, vec![2, 3]);
            assert_eq!(chord.sequences[1].chords, vec!["D".to_string(), String::new()]);
        }
        other => panic!("expected one chord subsection, got {:?}", other),
    }
}

#[test]
fn test_preview_unresolved_locations() {
    let document = single_section(vec![TabSubsection::new("t1", quarters(2)).into()]);
    let options = CompileOptions::default();

    for location in [
        GroupingLocation::section(4),
        GroupingLocation::subsection(0, 9),
        // Chord sequences only exist in chord subsections
        GroupingLocation::chord_sequence(0, 0, 0),
        GroupingLocation {
            section_index: 0,
            subsection_index: None,
            chord_sequence_index: Some(0),
        },
    ] {
        let preview = expand_specific_chord_grouping(&document, &location, &options);
        assert!(preview.sections.is_empty(), "{:?}", location);
        assert!(preview.metadata.is_empty(), "{:?}", location);
        assert_eq!(preview.diagnostics[0].kind, DiagnosticKind::UnresolvedLocation);
    }
}

#[test]
fn test_playable_unit_cap() {
    let tab = TabSubsection::new("t1", quarters(4));
    let document = single_section(vec![Subsection::from(tab).with_bpm(120.0).with_repetitions(100)]);
    let options = CompileOptions::default().with_max_playable_units(6);

    let compiled = expand_full_tab(&document, &[ProgressionEntry::new("s1", 5)], &options);

    assert_eq!(compiled.playable_count(), 6);
    assert_eq!(compiled.sections.len(), 1);
    assert!(compiled
        .diagnostics
        .iter()
        .any(|d| d.kind == DiagnosticKind::Truncated));
}

#[test]
fn test_cap_reached_exactly_is_not_truncation() {
    let tab = TabSubsection::new("t1", quarters(4));
    let document = single_section(vec![Subsection::from(tab).with_bpm(120.0)]);
    let options = CompileOptions::default().with_max_playable_units(4);

    let compiled = expand_full_tab(&document, &[ProgressionEntry::new("s1", 1)], &options);

    assert_eq!(compiled.playable_count(), 4);
    assert!(compiled.diagnostics.is_empty());
}

#[test]
fn test_measure_lines_after_the_cap_still_play() {
    let mut columns = quarters(4);
    columns.push(Column::measure_line("m1", Some(60.0)));
    let tab = TabSubsection::new("t1", columns);
    let document = single_section(vec![Subsection::from(tab).with_bpm(120.0)]);

    let uncapped = compile_once(&document);
    let options = CompileOptions::default().with_max_playable_units(4);
    let capped = expand_full_tab(&document, &[ProgressionEntry::new("s1", 1)], &options);

    assert_eq!(capped.metadata, uncapped.metadata);
    assert!(capped.diagnostics.is_empty());
    assert_elapsed(&capped.metadata, &[0.0, 0.5, 1.0, 1.5, 2.0, 4.0]);
    assert_eq!(capped.metadata[4].bpm, 60.0);
}

#[test]
fn test_cap_between_sections_drops_the_skipped_pass() {
    let document = TabDocument::new(vec![
        Section::new("a", "A", vec![Subsection::from(TabSubsection::new("t1", quarters(2))).with_bpm(120.0)]),
        Section::new("b", "B", vec![Subsection::from(TabSubsection::new("t2", quarters(2))).with_bpm(120.0)]),
    ]);
    let progression = vec![ProgressionEntry::new("a", 1), ProgressionEntry::new("b", 1)];
    let options = CompileOptions::default().with_max_playable_units(2);

    let compiled = expand_full_tab(&document, &progression, &options);

    // Section B had playable work left, so this is a truncation, but no empty B is kept
    assert_eq!(compiled.sections.len(), 1);
    assert_eq!(compiled.sections[0].id, "a");
    assert_eq!(compiled.playable_count(), 2);
    assert_eq!(compiled.diagnostics.len(), 1);
    assert_eq!(compiled.diagnostics[0].kind, DiagnosticKind::Truncated);
}

#[test]
fn test_measure_line_pattern_length_plays_as_quarter() {
    let pattern = StrummingPattern::new("p1", MEASURE_LINE, strums(3));
    let chords = ChordSubsection::new("ch1", vec![ChordSequence::new("q1", pattern, vec![])]);
    let document = single_section(vec![Subsection::from(chords).with_bpm(120.0)]);

    let compiled = compile_once(&document);
    let entries = real_entries(&compiled);

    assert_elapsed(entries, &[0.0, 0.5, 1.0]);
    assert!(entries.iter().all(|m| m.note_length_multiplier == "1"));
    assert!(entries.iter().all(|m| m.is_playable()));
    assert_eq!(compiled.diagnostics.len(), 1);
    assert_eq!(compiled.diagnostics[0].kind, DiagnosticKind::UnknownNoteLength);
    assert_eq!(compiled.diagnostics[0].location, Some(Location::strum(0, 0, 0, 0)));
}

#[test]
fn test_position_lookup() {
    let tab = TabSubsection::new(
        "t1",
        vec![
            Column::new("a", "quarter"),
            Column::measure_line("m1", None),
            Column::new("b", "quarter"),
        ],
    );
    let document = single_section(vec![Subsection::from(tab).with_bpm(120.0)]);
    let compiled = compile_once(&document);

    assert_eq!(compiled.position_at(0.25), Some(0));
    // The measure line and the column after it share a start; the column wins
    assert_eq!(compiled.position_at(0.5), Some(2));
    assert_eq!(compiled.position_at(100.0), Some(3));
    assert_close(compiled.duration_seconds(), 0.5 + 1.0 + 1.0);
}

#[test]
fn test_compilation_serializes_for_the_ui() {
    let tab = TabSubsection::new("t1", vec![Column::measure_line("m1", None), Column::new("a", "eighth")]);
    let document = single_section(vec![Subsection::from(tab).with_bpm(120.0)]);
    let compiled = compile_once(&document);

    let json = serde_json::to_value(&compiled).unwrap();
    let first = &json["metadata"][0];
    assert_eq!(first["noteLengthMultiplier"], "0");
    assert!(first.get("playbackIndex").is_none());
    assert!(first["location"].get("chordSequenceIndex").is_none());
    assert_eq!(json["metadata"][1]["playbackIndex"], 0);
    assert_eq!(json["sections"][0]["data"][0]["type"], "tab");
    assert_eq!(json["sections"][0]["data"][0]["indices"][0], 0);
}
