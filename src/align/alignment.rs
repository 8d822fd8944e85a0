use crate::align::cigar::{cigar_to_ops, EditOp, InvalidCigar};

const GAP: char = '-';

/// 按 CIGAR 回放比对：从 `x[pos..]` 和整个 `p` 各自向前消耗字符，
/// M 两边各取一个，D 只消耗参考串（查询侧补 `-`），I 只消耗查询串
/// （参考侧补 `-`）。返回等长的两行带空位比对串。
pub fn extract_alignment(
    x: &str,
    p: &str,
    pos: u32,
    cigar: &str,
) -> Result<(String, String), InvalidCigar> {
    let ops = cigar_to_ops(cigar)?;

    let mut row_x = String::new();
    let mut row_p = String::new();
    let mut xs = x.chars().skip(pos as usize);
    let mut ps = p.chars();

    for op in ops {
        match op {
            EditOp::M => {
                row_x.push(xs.next().unwrap_or(GAP));
                row_p.push(ps.next().unwrap_or(GAP));
            }
            EditOp::D => {
                row_x.push(xs.next().unwrap_or(GAP));
                row_p.push(GAP);
            }
            EditOp::I => {
                row_x.push(GAP);
                row_p.push(ps.next().unwrap_or(GAP));
            }
        }
    }

    Ok((row_x, row_p))
}

/// 比对串中不一致的列数：每个非 M 列占 1，对位字符不同的 M 列占 1。
/// 用于诊断输出和搜索结果的独立校验。
pub fn count_edits(x: &str, p: &str, pos: u32, cigar: &str) -> Result<usize, InvalidCigar> {
    let (row_x, row_p) = extract_alignment(x, p, pos, cigar)?;
    Ok(row_x
        .chars()
        .zip(row_p.chars())
        .filter(|(a, b)| a != b)
        .count())
}
