//! 近似搜索的随机化端到端检查，并用编解码器/重建器交叉验证：
//! 报告的每个命中都要能独立复核；精确出现必须全部找到；
//! 由参考经有限次编辑得到的读段必须能被召回。

use readmap::align::alignment::count_edits;
use readmap::align::approx::{Search, Searcher};
use readmap::index::fm::FMIndexTables;

/// 确定性生成器，与单元测试用同一组常数。
struct Lcg(u32);

impl Lcg {
    fn next(&mut self) -> u32 {
        self.0 = self.0.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        self.0 >> 16
    }

    fn below(&mut self, n: usize) -> usize {
        self.next() as usize % n
    }
}

const BASES: [char; 4] = ['a', 'c', 'g', 't'];

fn random_text(rng: &mut Lcg, len: usize) -> String {
    (0..len).map(|_| BASES[rng.below(4)]).collect()
}

fn collect_hits(searcher: &Searcher, pattern: &str, edits: u32) -> Vec<(u32, String)> {
    let mut hits = Vec::new();
    searcher.search(pattern, edits, &mut |pos, cigar| {
        hits.push((pos, cigar.to_string()));
    });
    hits
}

fn naive_occurrence_positions(text: &str, pattern: &str) -> Vec<u32> {
    if pattern.is_empty() || pattern.len() > text.len() {
        return Vec::new();
    }
    (0..=text.len() - pattern.len())
        .filter(|&i| &text[i..i + pattern.len()] == pattern)
        .map(|i| i as u32)
        .collect()
}

/// 对 `read` 恰好施加 `n` 次随机单字符编辑。
fn mutate(rng: &mut Lcg, read: &str, n: usize) -> String {
    let mut chars: Vec<char> = read.chars().collect();
    for _ in 0..n {
        match rng.below(3) {
            0 => {
                // substitution
                let i = rng.below(chars.len());
                chars[i] = BASES[rng.below(4)];
            }
            1 => {
                // insertion into the read
                let i = rng.below(chars.len() + 1);
                chars.insert(i, BASES[rng.below(4)]);
            }
            _ => {
                // deletion from the read
                if chars.len() > 1 {
                    let i = rng.below(chars.len());
                    chars.remove(i);
                }
            }
        }
    }
    chars.into_iter().collect()
}

#[test]
fn reported_hits_never_exceed_the_edit_budget() {
    let mut rng = Lcg(1_234_567);
    for round in 0..40 {
        let text_len = 10 + rng.below(30);
        let text = random_text(&mut rng, text_len);
        let searcher = Searcher::from_text(&text);
        let pattern_len = 3 + rng.below(6);
        let pattern = random_text(&mut rng, pattern_len);

        for edits in 0..3u32 {
            for (pos, cigar) in collect_hits(&searcher, &pattern, edits) {
                let count = count_edits(&text, &pattern, pos, &cigar).unwrap();
                assert!(
                    count <= edits as usize,
                    "round {round}: {pattern:?} in {text:?} at {pos} ({cigar}) \
                     needs {count} > {edits} edits"
                );
            }
        }
    }
}

#[test]
fn exact_occurrences_are_all_reported_with_zero_budget() {
    let mut rng = Lcg(42);
    for _ in 0..40 {
        let text_len = 12 + rng.below(24);
        let text = random_text(&mut rng, text_len);
        let searcher = Searcher::from_text(&text);

        let start = rng.below(text.len() - 4);
        let pattern = &text[start..start + 4];

        let mut positions: Vec<u32> = collect_hits(&searcher, pattern, 0)
            .into_iter()
            .map(|(pos, _)| pos)
            .collect();
        positions.sort_unstable();
        positions.dedup();

        assert_eq!(positions, naive_occurrence_positions(&text, pattern));
    }
}

#[test]
fn mutated_reads_are_recovered_within_budget() {
    let mut rng = Lcg(987_654_321);
    for round in 0..60 {
        // 结尾补一段 acgt，保证四种碱基都在字母表里，替换/插入不会越界
        let text_len = 20 + rng.below(30);
        let mut text = random_text(&mut rng, text_len);
        text.push_str("acgt");
        let searcher = Searcher::from_text(&text);

        let len = 6 + rng.below(6);
        let start = rng.below(text.len() - len);
        let edits = rng.below(3);
        let read = mutate(&mut rng, &text[start..start + len], edits);

        let hits = collect_hits(&searcher, &read, edits as u32);
        assert!(
            !hits.is_empty(),
            "round {round}: read {read:?} (from {start}, {edits} edits) \
             not found in {text:?}"
        );
    }
}

#[test]
fn deserialized_tables_search_identically() {
    let mut rng = Lcg(777);
    for _ in 0..10 {
        let text = random_text(&mut rng, 30);
        let live = Searcher::from_text(&text);
        let blob = live.tables().to_bytes().unwrap();
        let reloaded = Searcher::from_tables(FMIndexTables::from_bytes(&blob).unwrap());

        for _ in 0..5 {
            let pattern_len = 4 + rng.below(4);
            let pattern = random_text(&mut rng, pattern_len);
            for edits in 0..3u32 {
                let mut a = collect_hits(&live, &pattern, edits);
                let mut b = collect_hits(&reloaded, &pattern, edits);
                a.sort();
                b.sort();
                assert_eq!(a, b, "pattern {pattern:?}, edits {edits}");
            }
        }
    }
}
