//! # readmap
//!
//! 基于 FM 索引的近似匹配读段映射器。
//!
//! 对每条参考序列一次性构建紧凑全文索引（后缀数组 + BWT + 秩表），
//! 之后可反复查询：给定一个读段和编辑距离上限，报告它在参考中的每个
//! 出现位置以及解释该次匹配的编辑脚本（CIGAR）。包含：
//!
//! - **索引构建**：字母表映射、后缀数组、BWT、C/Occ 秩表，可序列化
//! - **近似搜索**：D 表剪枝的回溯搜索，惰性产出 `(位置, CIGAR)`
//! - **CIGAR 编解码**：编辑脚本与 `<count><op>` 文本形式互转
//! - **比对还原**：按 CIGAR 回放出带空位的比对串并独立复核编辑数
//!
//! ## 快速示例
//!
//! ```rust,no_run
//! use readmap::align::approx::{Search, Searcher};
//! use readmap::align::alignment::extract_alignment;
//!
//! let searcher = Searcher::from_text("acgtacgt");
//! searcher.search("gtc", 1, &mut |pos, cigar| {
//!     let (row_ref, row_read) =
//!         extract_alignment("acgtacgt", "gtc", pos, cigar).unwrap();
//!     println!("hit at {pos}: {cigar}\n{row_ref}\n{row_read}");
//! });
//! ```
//!
//! ## 模块说明
//!
//! - [`io`] — FASTA / FASTQ 解析与 SAM 输出
//! - [`index`] — FM 索引构建（后缀数组、BWT、秩表）与持久化
//! - [`align`] — 近似搜索、CIGAR 编解码、比对还原
//! - [`util`] — 动态字母表

pub mod align;
pub mod index;
pub mod io;
pub mod util;
