//! Performance measurement for dot role resolution over dense measures

// Criterion macros generate undocumented functions
#![allow(missing_docs)]

use criterion::{Criterion, criterion_group, criterion_main};
use glyphscore::glyph::{GlyphArena, Shape};
use glyphscore::score::dot::populate_dot;
use glyphscore::score::{Barline, Chord, ErrorSink, Measure, Note, Scale};
use glyphscore::spatial::BoundingBox;
use std::hint::black_box;

const INTERLINE: u32 = 10;

fn dense_measure(arena: &mut GlyphArena, chords: usize) -> Measure {
    let mut built = Vec::with_capacity(chords);
    for index in 0..chords {
        let x = 10 + (index as i32) * 20;
        let head = arena.register(vec![[x, 50]], INTERLINE);
        built.push(Chord {
            notes: vec![Note {
                glyph: head,
                shape: Shape::NoteheadBlack,
                bounds: BoundingBox::new([x - 4, 46], [x + 4, 54]),
            }],
            dots: 0,
            glyphs: Vec::new(),
        });
    }
    let barline_x = 10 + (chords as i32) * 20;
    let barline_glyph = arena.register(vec![[barline_x, 50]], INTERLINE);
    Measure {
        number: 1,
        left_x: 0,
        barline: Some(Barline {
            glyph: barline_glyph,
            left_x: barline_x,
            right_x: barline_x + 1,
            glyphs: Vec::new(),
        }),
        chords: built,
        articulations: Vec::new(),
        staff_mid_y: 45,
    }
}

/// Measures one dot competing against 64 chords and a repeat barline
fn bench_populate_dot(c: &mut Criterion) {
    c.bench_function("populate_dot_64_chords", |b| {
        b.iter(|| {
            let mut arena = GlyphArena::new();
            let measure = dense_measure(&mut arena, 64);
            let dot = arena.register(vec![[655, 50]], INTERLINE);
            if let Some(glyph) = arena.get_mut(dot) {
                glyph.set_shape(Some(Shape::Dot));
            }
            let mut measures = vec![measure];
            let mut errors = ErrorSink::default();

            let result = populate_dot(
                &mut arena,
                black_box(dot),
                &mut measures,
                0,
                black_box([655, 50]),
                Scale::new(INTERLINE),
                &mut errors,
            );
            black_box(result.is_ok());
        });
    });
}

criterion_group!(benches, bench_populate_dot);
criterion_main!(benches);
