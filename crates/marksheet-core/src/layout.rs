use crate::geometry::BBox;
use crate::words::Word;

/// A text line: a sequence of words on the same y-level.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    /// Words in this line, sorted left-to-right.
    pub words: Vec<Word>,
    /// Bounding box of this line.
    pub bbox: BBox,
}

impl TextLine {
    /// Words joined by single spaces.
    pub fn text(&self) -> String {
        self.words
            .iter()
            .map(|w| w.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A text block: a group of lines forming a coherent paragraph or cell.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    /// Lines in this block, sorted top-to-bottom.
    pub lines: Vec<TextLine>,
    /// Bounding box of this block.
    pub bbox: BBox,
}

impl TextBlock {
    /// Lines joined by newlines.
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(TextLine::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Cluster words into text lines based on y-proximity.
///
/// Words whose vertical midpoints are within `y_tolerance` of a line's
/// vertical midpoint are grouped into the same line. Words within each
/// line are sorted left-to-right.
pub fn cluster_words_into_lines(words: &[Word], y_tolerance: f64) -> Vec<TextLine> {
    if words.is_empty() {
        return Vec::new();
    }

    let mut sorted: Vec<&Word> = words.iter().collect();
    sorted.sort_by(|a, b| {
        a.bbox
            .top
            .total_cmp(&b.bbox.top)
            .then(a.bbox.x0.total_cmp(&b.bbox.x0))
    });

    let mut lines: Vec<TextLine> = Vec::new();

    for word in sorted {
        let word_mid_y = word.bbox.mid_y();
        match lines
            .iter_mut()
            .find(|line| (word_mid_y - line.bbox.mid_y()).abs() <= y_tolerance)
        {
            Some(line) => {
                line.bbox = line.bbox.union(&word.bbox);
                line.words.push(word.clone());
            }
            None => lines.push(TextLine {
                words: vec![word.clone()],
                bbox: word.bbox,
            }),
        }
    }

    for line in &mut lines {
        line.words.sort_by(|a, b| a.bbox.x0.total_cmp(&b.bbox.x0));
    }
    lines.sort_by(|a, b| a.bbox.top.total_cmp(&b.bbox.top));

    lines
}

/// Split text lines at large horizontal gaps.
///
/// Within each line, if consecutive words have a gap larger than `x_density`,
/// the line is split into separate line segments. A label and its value in
/// two table cells therefore become two segments on the same row.
pub fn split_lines_at_columns(lines: Vec<TextLine>, x_density: f64) -> Vec<TextLine> {
    let mut result = Vec::new();
    for line in lines {
        let mut words = line.words.into_iter();
        let Some(first) = words.next() else {
            continue;
        };

        let mut current_bbox = first.bbox;
        let mut current_words = vec![first];

        for word in words {
            let gap = word.bbox.x0 - current_bbox.x1;
            if gap > x_density {
                result.push(TextLine {
                    words: std::mem::take(&mut current_words),
                    bbox: current_bbox,
                });
                current_bbox = word.bbox;
            } else {
                current_bbox = current_bbox.union(&word.bbox);
            }
            current_words.push(word);
        }

        result.push(TextLine {
            words: current_words,
            bbox: current_bbox,
        });
    }

    result.sort_by(|a, b| {
        a.bbox
            .top
            .total_cmp(&b.bbox.top)
            .then(a.bbox.x0.total_cmp(&b.bbox.x0))
    });

    result
}

/// Cluster text line segments into text blocks based on x-overlap and vertical proximity.
///
/// Line segments that vertically follow each other (gap <= `y_density`) and
/// have overlapping x-ranges are grouped into the same block.
pub fn cluster_lines_into_blocks(lines: Vec<TextLine>, y_density: f64) -> Vec<TextBlock> {
    let mut blocks: Vec<TextBlock> = Vec::new();

    for line in lines {
        let mut best_block: Option<usize> = None;
        let mut best_gap = f64::INFINITY;

        for (i, block) in blocks.iter().enumerate() {
            let gap = line.bbox.top - block.bbox.bottom;
            if gap >= 0.0
                && gap <= y_density
                && has_x_overlap(&line.bbox, &block.bbox)
                && gap < best_gap
            {
                best_gap = gap;
                best_block = Some(i);
            }
        }

        match best_block {
            Some(idx) => {
                blocks[idx].bbox = blocks[idx].bbox.union(&line.bbox);
                blocks[idx].lines.push(line);
            }
            None => blocks.push(TextBlock {
                bbox: line.bbox,
                lines: vec![line],
            }),
        }
    }

    for block in &mut blocks {
        block.lines.sort_by(|a, b| a.bbox.top.total_cmp(&b.bbox.top));
    }

    blocks
}

fn has_x_overlap(a: &BBox, b: &BBox) -> bool {
    a.x0 < b.x1 && b.x0 < a.x1
}

/// Sort text blocks top-to-bottom, then left-to-right.
pub fn sort_blocks_reading_order(blocks: &mut [TextBlock]) {
    blocks.sort_by(|a, b| {
        a.bbox
            .top
            .total_cmp(&b.bbox.top)
            .then(a.bbox.x0.total_cmp(&b.bbox.x0))
    });
}
