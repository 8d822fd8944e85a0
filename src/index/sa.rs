/// 构建后缀数组（倍增法，O(n log^2 n)）。
/// 输入为编码后的文本（0 为哨兵，应出现在末尾），输出按字典序
/// 排列的全部后缀起点。任何良构编码数组都能成功构建。
pub fn build_sa(text: &[u8]) -> Vec<u32> {
    let n = text.len();
    if n == 0 {
        return Vec::new();
    }

    // rank[i] 为当前比较长度下后缀 i 的名次，-1 表示越界（比一切都小）
    let mut rank: Vec<i64> = text.iter().map(|&c| i64::from(c)).collect();
    let mut next_rank: Vec<i64> = vec![0; n];
    let mut sa: Vec<usize> = (0..n).collect();

    fn key(rank: &[i64], i: usize, k: usize) -> (i64, i64) {
        let second = if i + k < rank.len() { rank[i + k] } else { -1 };
        (rank[i], second)
    }

    let mut k = 1;
    loop {
        sa.sort_unstable_by_key(|&i| key(&rank, i, k));

        // 重新命名：相邻 key 相同则名次相同
        next_rank[sa[0]] = 0;
        for w in 1..n {
            let bump = i64::from(key(&rank, sa[w], k) != key(&rank, sa[w - 1], k));
            next_rank[sa[w]] = next_rank[sa[w - 1]] + bump;
        }
        rank.copy_from_slice(&next_rank);

        if rank[sa[n - 1]] as usize == n - 1 || k >= n {
            break;
        }
        k <<= 1;
    }

    sa.into_iter().map(|i| i as u32).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naive_sa(text: &[u8]) -> Vec<u32> {
        let mut sa: Vec<u32> = (0..text.len() as u32).collect();
        sa.sort_by_key(|&i| &text[i as usize..]);
        sa
    }

    fn lcg_text(len: usize, seed: u32, sigma: u8) -> Vec<u8> {
        let mut x = seed;
        (0..len)
            .map(|_| {
                x = x.wrapping_mul(1_103_515_245).wrapping_add(12_345);
                (x >> 16) as u8 % sigma
            })
            .collect()
    }

    #[test]
    fn sa_basic() {
        // 文本 a c g t $ -> 1 2 3 4 0
        let text = [1u8, 2, 3, 4, 0];
        assert_eq!(build_sa(&text), vec![4, 0, 1, 2, 3]);
    }

    #[test]
    fn sa_empty() {
        assert!(build_sa(&[]).is_empty());
    }

    #[test]
    fn sa_sentinel_sorts_first() {
        // 哨兵在末尾时必然排在第一位
        let text = [3u8, 1, 3, 1, 2, 0];
        let sa = build_sa(&text);
        assert_eq!(sa[0], 5);
        assert_eq!(sa, naive_sa(&text));
    }

    #[test]
    fn sa_repetitive_text() {
        // 高重复文本是倍增法重命名步骤的典型陷阱
        let mut text = vec![1u8; 64];
        text.push(0);
        assert_eq!(build_sa(&text), naive_sa(&text));
    }

    #[test]
    fn sa_matches_naive_on_random_texts() {
        for len in 1..=40 {
            let mut text = lcg_text(len, 1_234_567 + len as u32, 4);
            for c in &mut text {
                *c += 1;
            }
            text.push(0);
            assert_eq!(build_sa(&text), naive_sa(&text), "mismatch on len={len}");
        }
    }
}
