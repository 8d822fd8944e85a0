/// 由后缀数组推导 Burrows–Wheeler 变换：`bwt[i] = text[sa[i] - 1]`，
/// `sa[i] == 0` 时取末尾字符（即哨兵）。构建后只读。
pub fn build_bwt(text: &[u8], sa: &[u32]) -> Vec<u8> {
    let n = text.len();
    debug_assert_eq!(n, sa.len());
    sa.iter()
        .map(|&p| {
            let i = p as usize;
            if i == 0 {
                text[n - 1]
            } else {
                text[i - 1]
            }
        })
        .collect()
}
