//! Validates the system translation loop: measure assembly, chord grouping,
//! checker-driven re-translation and cross-system measure numbering

use glyphscore::glyph::{GlyphArena, GlyphId, Shape, TranslationRef};
use glyphscore::score::{Page, Scale, StaffInfo, Step, SystemInfo};
use glyphscore::translate::{translate_page, translate_page_with, translate_system};

const INTERLINE: u32 = 10;
const MID_Y: i32 = 50;

fn register_shaped(
    arena: &mut GlyphArena,
    pixels: Vec<[i32; 2]>,
    shape: Shape,
) -> GlyphId {
    let id = arena.register(pixels, INTERLINE);
    if let Some(glyph) = arena.get_mut(id) {
        glyph.set_shape(Some(shape));
    }
    id
}

fn barline_stick(arena: &mut GlyphArena, x: i32) -> GlyphId {
    let pixels = (30..71).map(|y| [x, y]).collect();
    register_shaped(arena, pixels, Shape::ThinBarline)
}

fn note_head(arena: &mut GlyphArena, center: [i32; 2]) -> GlyphId {
    let mut pixels = Vec::new();
    for y in (center[1] - 2)..=(center[1] + 2) {
        for x in (center[0] - 2)..=(center[0] + 2) {
            pixels.push([x, y]);
        }
    }
    register_shaped(arena, pixels, Shape::NoteheadBlack)
}

fn fresh_system(arena: &GlyphArena) -> SystemInfo {
    let mut system = SystemInfo::new(0, Scale::new(INTERLINE));
    system.staves.push(StaffInfo::new(MID_Y, INTERLINE));
    for id in 0..arena.len() {
        system.add_glyph(id);
    }
    system
}

#[test]
fn test_measures_follow_barline_abscissa_order() {
    let mut arena = GlyphArena::new();
    // Registered right to left; translation must reorder them
    let right = barline_stick(&mut arena, 80);
    let left = barline_stick(&mut arena, 40);
    let head_one = note_head(&mut arena, [20, MID_Y]);
    let head_two = note_head(&mut arena, [60, MID_Y]);
    let mut system = fresh_system(&arena);

    let result = translate_system(&mut arena, &mut system);

    assert!(result.is_ok());
    assert_eq!(system.measures.len(), 2);
    assert!(system.measures.first().is_some_and(|m| {
        m.barline.as_ref().is_some_and(|b| b.glyph == left)
            && m.chords.len() == 1
            && m.chords.first().is_some_and(|c| {
                c.notes.first().is_some_and(|n| n.glyph == head_one)
            })
    }));
    assert!(system.measures.get(1).is_some_and(|m| {
        m.barline.as_ref().is_some_and(|b| b.glyph == right)
            && m.chords.first().is_some_and(|c| {
                c.notes.first().is_some_and(|n| n.glyph == head_two)
            })
    }));
    assert!(arena.get(right).is_some_and(|g| {
        g.translation() == Some(TranslationRef::Barline { measure: 1 })
    }));
}

#[test]
fn test_vertically_aligned_heads_form_one_chord() {
    let mut arena = GlyphArena::new();
    let _barline = barline_stick(&mut arena, 90);
    let upper = note_head(&mut arena, [20, MID_Y - 10]);
    let lower = note_head(&mut arena, [20, MID_Y + 10]);
    let apart = note_head(&mut arena, [50, MID_Y]);
    let mut system = fresh_system(&arena);

    let result = translate_system(&mut arena, &mut system);

    assert!(result.is_ok());
    assert!(system.measures.first().is_some_and(|m| {
        m.chords.len() == 2
            && m.chords.first().is_some_and(|c| {
                c.notes.iter().map(|n| n.glyph).collect::<Vec<_>>() == vec![upper, lower]
            })
            && m.chords.get(1).is_some_and(|c| {
                c.notes.first().is_some_and(|n| n.glyph == apart)
            })
    }));
}

#[test]
fn test_notes_beyond_last_barline_clamp_to_last_measure() {
    let mut arena = GlyphArena::new();
    let _barline = barline_stick(&mut arena, 40);
    let stray = note_head(&mut arena, [70, MID_Y]);
    let mut system = fresh_system(&arena);

    let result = translate_system(&mut arena, &mut system);

    assert!(result.is_ok());
    assert_eq!(system.measures.len(), 1);
    assert!(arena.get(stray).is_some_and(|g| {
        g.translation() == Some(TranslationRef::Chord { measure: 0, chord: 0 })
    }));
}

#[test]
fn test_lone_repeat_dot_is_demoted_on_second_pass() {
    let mut page = Page::new();
    let barline = barline_stick(&mut page.arena, 40);
    // Pitch position +1, close enough to read as half a repeat sign
    let dot = page.arena.register(vec![[36, MID_Y + 5]], INTERLINE);
    if let Some(glyph) = page.arena.get_mut(dot) {
        glyph.set_shape(Some(Shape::Dot));
    }
    page.systems.push(fresh_system(&page.arena));

    let result = translate_page(&mut page);

    assert!(result.is_ok());
    // First pass attaches the dot to the barline, the checker strips it, and
    // the second pass leaves a clean barline
    assert!(page.arena.get(dot).is_some_and(|g| g.shape().is_none()));
    let system = page.systems.first();
    assert!(system.is_some_and(|s| {
        s.measures.first().is_some_and(|m| {
            m.barline
                .as_ref()
                .is_some_and(|b| b.glyph == barline && b.glyphs.is_empty())
        })
    }));
}

#[test]
fn test_unassignable_dot_error_survives_the_loop() {
    let mut page = Page::new();
    let _barline = barline_stick(&mut page.arena, 40);
    // Far above the staff, out of reach of every hypothesis
    let dot = page.arena.register(vec![[20, MID_Y - 200]], INTERLINE);
    if let Some(glyph) = page.arena.get_mut(dot) {
        glyph.set_shape(Some(Shape::Dot));
    }
    page.systems.push(fresh_system(&page.arena));

    let result = translate_page(&mut page);

    assert!(result.is_ok());
    let system = page.systems.first();
    assert!(system.is_some_and(|s| {
        s.errors.count_for(Step::Translation) == 1
            && s.errors
                .records()
                .iter()
                .any(|record| record.glyph == Some(dot))
    }));
}

#[test]
fn test_dot_in_structureless_system_is_still_reported() {
    let mut page = Page::new();
    // Nothing but one dot: no barlines, no notes, no measures to build
    let dot = page.arena.register(vec![[20, MID_Y]], INTERLINE);
    if let Some(glyph) = page.arena.get_mut(dot) {
        glyph.set_shape(Some(Shape::Dot));
    }
    page.systems.push(fresh_system(&page.arena));

    let result = translate_page(&mut page);

    assert!(result.is_ok());
    let system = page.systems.first();
    assert!(system.is_some_and(|s| {
        s.measures.is_empty()
            && s.errors.count_for(Step::Translation) == 1
            && s.errors
                .records()
                .iter()
                .any(|record| record.glyph == Some(dot) && record.message.contains("unassigned"))
    }));
    assert!(page.arena.get(dot).is_some_and(|g| g.translation().is_none()));
}

#[test]
fn test_always_modified_check_stops_at_the_iteration_cap() {
    let mut page = Page::new();
    let _barline = barline_stick(&mut page.arena, 40);
    let _head = note_head(&mut page.arena, [20, MID_Y]);
    page.systems.push(fresh_system(&page.arena));

    let mut passes = 0;
    let result = translate_page_with(&mut page, |_, _| {
        passes += 1;
        true
    });

    // Two iterations, then a clean stop with the structure kept
    assert!(result.is_ok());
    assert_eq!(passes, 2);
    assert!(page.systems.first().is_some_and(|s| {
        s.measures.len() == 1
            && s.errors.count_for(Step::Translation) == 0
            && s.measures.first().is_some_and(|m| m.chords.len() == 1)
    }));
}

#[test]
fn test_translation_is_idempotent_on_converged_input() {
    let mut page = Page::new();
    let _barline = barline_stick(&mut page.arena, 80);
    let _head = note_head(&mut page.arena, [20, MID_Y]);
    page.systems.push(fresh_system(&page.arena));

    assert!(translate_page(&mut page).is_ok());
    let first: Vec<(usize, usize)> = page
        .systems
        .iter()
        .flat_map(|s| s.measures.iter().map(|m| (m.number, m.chords.len())))
        .collect();

    assert!(translate_page(&mut page).is_ok());
    let second: Vec<(usize, usize)> = page
        .systems
        .iter()
        .flat_map(|s| s.measures.iter().map(|m| (m.number, m.chords.len())))
        .collect();

    assert_eq!(first, second);
}

#[test]
fn test_epilog_numbers_measures_across_systems() {
    let mut page = Page::new();
    let mut first_glyphs = Vec::new();
    for x in [40, 80] {
        first_glyphs.push(barline_stick(&mut page.arena, x));
    }
    let mut second_glyphs = Vec::new();
    for x in [40, 80, 120] {
        second_glyphs.push(barline_stick(&mut page.arena, x));
    }

    let mut first = SystemInfo::new(0, Scale::new(INTERLINE));
    first.staves.push(StaffInfo::new(MID_Y, INTERLINE));
    for id in first_glyphs {
        first.add_glyph(id);
    }
    let mut second = SystemInfo::new(1, Scale::new(INTERLINE));
    second.staves.push(StaffInfo::new(MID_Y, INTERLINE));
    for id in second_glyphs {
        second.add_glyph(id);
    }
    page.systems.push(first);
    page.systems.push(second);

    let result = translate_page(&mut page);

    assert!(result.is_ok());
    let numbers: Vec<usize> = page
        .systems
        .iter()
        .flat_map(|s| s.measures.iter().map(|m| m.number))
        .collect();
    assert_eq!(numbers, vec![1, 2, 3, 4, 5]);
}

#[test]
fn test_absorbed_glyphs_are_purged_before_translation() {
    let mut page = Page::new();
    let a = note_head(&mut page.arena, [20, MID_Y]);
    let b = note_head(&mut page.arena, [23, MID_Y]);
    let merged = page.arena.merge(&[a, b], INTERLINE);
    assert!(merged.is_ok_and(|merged| {
        if let Some(glyph) = page.arena.get_mut(merged) {
            glyph.set_shape(Some(Shape::NoteheadBlack));
        }
        let mut system = SystemInfo::new(0, Scale::new(INTERLINE));
        system.staves.push(StaffInfo::new(MID_Y, INTERLINE));
        system.add_glyph(a);
        system.add_glyph(b);
        page.systems.push(system);

        translate_page(&mut page).is_ok()
            && page.systems.first().is_some_and(|s| {
                s.glyphs == vec![merged]
                    && s.measures.first().is_some_and(|m| {
                        m.chords.len() == 1
                            && m.chords.first().is_some_and(|c| {
                                c.notes.first().is_some_and(|n| n.glyph == merged)
                            })
                    })
            })
    }));
}
