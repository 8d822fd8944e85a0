use std::ops::Range;

use crate::align::cigar::{ops_to_cigar, EditOp, EditOps};
use crate::index::fm::FMIndexTables;

/// 每个查询串构建一次的下界表。
///
/// 正向扫描 pattern，同时在反向文本的表上维护已扫过片段的 FM 区间
/// （反向表上的前加等价于正向的后接，区间始终对应 pattern 的一段连续
/// 子串在文本中的出现）。区间一旦变空，说明该片段在文本中不存在，至少
/// 需要一次编辑：计数器加一并重置为全区间继续。`d[i]` 即处理到位置 i
/// 时的计数器值，是匹配剩余前缀 `p[0..=i]` 所需编辑数的不过估下界，
/// 据此剪枝不会丢失真命中。
pub fn build_d_table(tables: &FMIndexTables, pattern: &[u8]) -> Vec<u32> {
    let mut d = Vec::with_capacity(pattern.len());
    let (mut lo, mut hi) = tables.full_range();
    let mut edits = 0u32;

    for &s in pattern {
        let (nl, nh) = tables.rev_rank_range(s, lo, hi);
        if nl >= nh {
            edits += 1;
            let full = tables.full_range();
            lo = full.0;
            hi = full.1;
        } else {
            lo = nl;
            hi = nh;
        }
        d.push(edits);
    }

    d
}

/// 回溯搜索的一个待展开结点。`i` 为下一个要消耗的 pattern 位置
/// （从右往左走，-1 表示整个 pattern 已消耗完），`ops` 为倒序累积的
/// 编辑脚本，上报前再反转。
struct Frame {
    i: isize,
    lo: usize,
    hi: usize,
    budget: u32,
    ops: EditOps,
}

/// 有界编辑距离下的全部匹配，惰性产出 `(文本位置, 编辑脚本)`。
///
/// 显式栈上的深度优先遍历，避免长 pattern 打爆递归深度；在压栈前用
/// D 表剪枝（`budget < d[i]` 的结点不可能成功）。重复性高的参考上
/// 命中可能非常多，因此不物化结果列表；随时 drop 迭代器即放弃剩余
/// 搜索空间，不会破坏任何状态。产出顺序不保证。
pub struct ApproxMatches<'a> {
    tables: &'a FMIndexTables,
    pattern: Vec<u8>,
    d: Vec<u32>,
    stack: Vec<Frame>,
    // 命中区间逐个出位置；区间耗尽后再回到栈上
    emitting: Option<(Range<usize>, EditOps)>,
}

impl<'a> ApproxMatches<'a> {
    pub fn new(tables: &'a FMIndexTables, pattern: Vec<u8>, edits: u32) -> Self {
        let d = build_d_table(tables, &pattern);

        let mut stack = Vec::new();
        if !tables.is_empty() && !pattern.is_empty() {
            let m = pattern.len();
            // 根结点也要过剪枝检查
            if edits >= d[m - 1] {
                let (lo, hi) = tables.full_range();
                stack.push(Frame {
                    i: m as isize - 1,
                    lo,
                    hi,
                    budget: edits,
                    ops: EditOps::new(),
                });
            }
        }

        Self { tables, pattern, d, stack, emitting: None }
    }

    /// 剩余前缀 `p[0..=i]` 的编辑数下界；pattern 消耗完后为 0。
    #[inline]
    fn lower_bound(&self, i: isize) -> u32 {
        if i < 0 {
            0
        } else {
            self.d[i as usize]
        }
    }

    fn expand(&mut self, frame: Frame) {
        let Frame { i, lo, hi, budget, ops } = frame;
        debug_assert!(i >= 0);
        let pi = self.pattern[i as usize];

        // 压栈顺序与探索顺序相反；顺序只影响枚举次序，不影响完备性。

        // 删除：文本多一个字符，pattern 位置不动。budget 为 0 时只剩
        // 零代价的匹配分支可走。
        if budget >= 1 && budget - 1 >= self.lower_bound(i) {
            for s in 1..self.tables.sigma {
                let (nl, nh) = self.tables.rank_range(s, lo, hi);
                if nl < nh {
                    let mut ops = ops.clone();
                    ops.push(EditOp::D);
                    self.stack.push(Frame { i, lo: nl, hi: nh, budget: budget - 1, ops });
                }
            }
        }

        // 插入：pattern 多一个字符，区间不动
        if budget >= 1 && budget - 1 >= self.lower_bound(i - 1) {
            let mut ops = ops.clone();
            ops.push(EditOp::I);
            self.stack.push(Frame { i: i - 1, lo, hi, budget: budget - 1, ops });
        }

        // 匹配/替换：对每个符号反向扩展一步，对位相同零代价，否则记一次编辑
        for s in 1..self.tables.sigma {
            let cost = u32::from(s != pi);
            if budget < cost || budget - cost < self.lower_bound(i - 1) {
                continue;
            }
            let (nl, nh) = self.tables.rank_range(s, lo, hi);
            if nl < nh {
                let mut ops = ops.clone();
                ops.push(EditOp::M);
                self.stack.push(Frame { i: i - 1, lo: nl, hi: nh, budget: budget - cost, ops });
            }
        }
    }
}

impl Iterator for ApproxMatches<'_> {
    type Item = (u32, EditOps);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((mut range, ops)) = self.emitting.take() {
                if let Some(j) = range.next() {
                    let pos = self.tables.sa[j];
                    self.emitting = Some((range, ops.clone()));
                    return Some((pos, ops));
                }
            }

            let frame = self.stack.pop()?;
            if frame.i < 0 {
                // pattern 消耗完，区间里每个后缀都是一个命中
                debug_assert!(frame.lo < frame.hi);
                let mut ops = frame.ops;
                ops.reverse();
                self.emitting = Some((frame.lo..frame.hi, ops));
            } else {
                self.expand(frame);
            }
        }
    }
}

/// 一个就绪可查的参考序列：索引表 + 面向字符串的查询入口。
/// 由在线构建（[`from_text`](Self::from_text)）或反序列化的表
/// （[`from_tables`](Self::from_tables)）构造，两者对调用方完全等价。
pub struct Searcher {
    tables: FMIndexTables,
}

/// 对单条参考序列的回调式近似搜索。实现把每个命中以
/// `(位置, CIGAR)` 报告出来；位置不保证任何顺序。
pub trait Search {
    fn search(&self, pattern: &str, edits: u32, cb: &mut dyn FnMut(u32, &str));
}

impl Searcher {
    pub fn from_text(text: &str) -> Self {
        Self { tables: FMIndexTables::build(text) }
    }

    pub fn from_tables(tables: FMIndexTables) -> Self {
        Self { tables }
    }

    pub fn tables(&self) -> &FMIndexTables {
        &self.tables
    }

    /// [`Search::search`] 的惰性版本：可随时放弃的迭代器，逐个产出
    /// `(位置, 编辑脚本)` 对。
    pub fn matches(&self, pattern: &str, edits: u32) -> Option<ApproxMatches<'_>> {
        let coded = self.tables.alphabet.map_to_bytes(pattern).ok()?;
        Some(ApproxMatches::new(&self.tables, coded, edits))
    }
}

impl Search for Searcher {
    fn search(&self, pattern: &str, edits: u32, cb: &mut dyn FnMut(u32, &str)) {
        // pattern 含字母表之外的字符时无命中；带类型的错误仍可通过
        // Alphabet::map_to_bytes 拿到，由调用方自行决定是否当错误处理
        let Some(matches) = self.matches(pattern, edits) else {
            return;
        };
        for (pos, ops) in matches {
            cb(pos, &ops_to_cigar(&ops));
        }
    }
}
