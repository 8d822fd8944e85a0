use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::index::{bwt, sa};
use crate::util::alphabet::Alphabet;

/// Occ 采样块长的默认值：染色体级文本的内存/查询速度折中。
/// 测试里会用更小的块长以覆盖块边界。
pub const DEFAULT_BLOCK: usize = 512;

/// 构建信息，随索引一起落盘，便于事后追溯。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexMeta {
    pub reference_file: Option<String>,
    pub build_args: Option<String>,
    pub build_timestamp: Option<String>,
}

/// FM 索引表：近似匹配搜索所需的全部持久化状态。
///
/// - C 表：`c[s]` = 文本中编码严格小于 s 的符号个数（正反向文本相同）。
/// - Occ 采样：按定长块存块首累计计数（行优先展平），块内顺扫补偿。
/// - 反向文本的 BWT/Occ：只用于查询串下界表（D 表）的子串存在性判断，
///   保证剪枝永不丢真命中；不带 SA。
/// - 完整 SA：区间到文本位置的直接映射。
/// - 字母表：与查询串共享同一编码空间，因此必须随表一起序列化。
///
/// 构建后只读，可被任意多个并发搜索共享。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FMIndexTables {
    pub sigma: u8,
    pub block: u32,
    pub c: Vec<u32>,
    pub bwt: Vec<u8>,
    pub occ_samples: Vec<u32>,
    pub rev_bwt: Vec<u8>,
    pub rev_occ_samples: Vec<u32>,
    pub sa: Vec<u32>,
    pub alphabet: Alphabet,
    pub meta: Option<IndexMeta>,
}

impl FMIndexTables {
    /// 从原始参考串构建全部索引表：字母表、带哨兵的编码文本、
    /// 后缀数组、BWT，以及正反两个方向的 C 表和采样 Occ 表。
    /// 对任意输入串都不会失败，只有资源耗尽才会中止。
    pub fn build(text: &str) -> Self {
        Self::build_with_block(text, DEFAULT_BLOCK)
    }

    pub fn build_with_block(text: &str, block: usize) -> Self {
        assert!(block > 0, "occ sample block must be positive");

        let alphabet = Alphabet::new(text);
        let coded = alphabet
            .map_to_bytes(text)
            .expect("alphabet covers its own text");

        let mut fwd = coded.clone();
        fwd.push(0); // sentinel
        let sa = sa::build_sa(&fwd);
        let bwt = bwt::build_bwt(&fwd, &sa);

        let mut rev = coded;
        rev.reverse();
        rev.push(0);
        let rev_sa = sa::build_sa(&rev);
        let rev_bwt = bwt::build_bwt(&rev, &rev_sa);

        let sigma = alphabet.sigma() as u8;
        let (c, occ_samples) = build_rank_tables(&bwt, sigma as usize, block);
        // 反向文本的符号计数与正向相同，C 表共用，只需 Occ 采样
        let (_, rev_occ_samples) = build_rank_tables(&rev_bwt, sigma as usize, block);

        Self {
            sigma,
            block: block as u32,
            c,
            bwt,
            occ_samples,
            rev_bwt,
            rev_occ_samples,
            sa,
            alphabet,
            meta: None,
        }
    }

    pub fn set_meta(&mut self, meta: IndexMeta) {
        self.meta = Some(meta);
    }

    /// 索引文本长度（含哨兵）。
    #[inline]
    pub fn len(&self) -> usize {
        self.bwt.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bwt.is_empty()
    }

    /// `Occ(s, pos)`：BWT 前缀 `bwt[0..pos)` 中编码 s 的出现次数。
    /// 最近块首采样 + 块内残余顺扫。
    #[inline]
    pub fn occ(&self, s: u8, pos: usize) -> u32 {
        occ_in(
            &self.bwt,
            &self.occ_samples,
            self.sigma as usize,
            self.block as usize,
            s,
            pos,
        )
    }

    /// 反向扩展一步：在区间 [lo, hi) 前加符号 s，得到新区间。
    /// 空区间（lo == hi）表示文本中不存在扩展后的串。
    #[inline]
    pub fn rank_range(&self, s: u8, lo: usize, hi: usize) -> (usize, usize) {
        let base = self.c[s as usize] as usize;
        (base + self.occ(s, lo) as usize, base + self.occ(s, hi) as usize)
    }

    /// 同 [`rank_range`](Self::rank_range)，但作用在反向文本的表上；
    /// 在反向文本上前加符号等价于在正向文本上后接符号。
    #[inline]
    pub fn rev_rank_range(&self, s: u8, lo: usize, hi: usize) -> (usize, usize) {
        let sigma = self.sigma as usize;
        let block = self.block as usize;
        let base = self.c[s as usize] as usize;
        let at = |pos| occ_in(&self.rev_bwt, &self.rev_occ_samples, sigma, block, s, pos) as usize;
        (base + at(lo), base + at(hi))
    }

    /// 整个后缀数组的区间，搜索的起点。
    #[inline]
    pub fn full_range(&self) -> (usize, usize) {
        (0, self.len())
    }

    /// 精确反向搜索，pat 为编码串（不含哨兵 0）。
    pub fn backward_search(&self, pat: &[u8]) -> Option<(usize, usize)> {
        if self.is_empty() {
            return None;
        }
        let (mut lo, mut hi) = self.full_range();
        for &s in pat.iter().rev() {
            let (nl, nh) = self.rank_range(s, lo, hi);
            if nl >= nh {
                return None;
            }
            lo = nl;
            hi = nh;
        }
        Some((lo, hi))
    }

    /// 区间对应的文本位置（完整 SA 直接切片）。
    pub fn sa_interval_positions(&self, lo: usize, hi: usize) -> &[u32] {
        &self.sa[lo..hi]
    }

    /// 把索引表序列化成不透明的字节块。
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    /// 反序列化并做结构校验。损坏的表在这里就被拒绝，
    /// 而不是留到后面表现为越界的 rank 查询和悄悄错误的结果。
    pub fn from_bytes(blob: &[u8]) -> Result<Self> {
        let tables: Self = bincode::deserialize(blob)?;
        tables.validate()?;
        Ok(tables)
    }

    /// 反序列化后各表之间的一致性检查。
    pub fn validate(&self) -> Result<()> {
        let n = self.bwt.len();
        let sigma = self.sigma as usize;
        let block = self.block as usize;

        if sigma != self.alphabet.sigma() {
            bail!("fm tables: sigma {} does not match alphabet", self.sigma);
        }
        if block == 0 {
            bail!("fm tables: zero occ sample block");
        }
        if self.sa.len() != n || self.rev_bwt.len() != n {
            bail!("fm tables: sa/bwt/rev_bwt lengths disagree");
        }
        if self.c.len() != sigma {
            bail!("fm tables: c table length {} != sigma {}", self.c.len(), sigma);
        }
        let num_blocks = (n + block - 1) / block;
        if self.occ_samples.len() != num_blocks * sigma
            || self.rev_occ_samples.len() != num_blocks * sigma
        {
            bail!("fm tables: occ sample length != {} blocks x sigma", num_blocks);
        }
        if !self.alphabet.codes_in_range(&self.bwt) || !self.alphabet.codes_in_range(&self.rev_bwt)
        {
            bail!("fm tables: bwt contains codes outside the alphabet");
        }
        if n > 0 {
            if self.bwt.iter().filter(|&&s| s == 0).count() != 1
                || self.rev_bwt.iter().filter(|&&s| s == 0).count() != 1
            {
                bail!("fm tables: bwt must contain exactly one sentinel");
            }
            if self.sa.iter().any(|&p| p as usize >= n) {
                bail!("fm tables: sa entry out of range");
            }
        }
        Ok(())
    }
}

#[inline]
fn occ_in(bwt: &[u8], samples: &[u32], sigma: usize, block: usize, s: u8, pos: usize) -> u32 {
    if pos == 0 {
        return 0;
    }
    let bi = (pos - 1) / block;
    let start = bi * block;
    let sampled = samples[bi * sigma + s as usize];
    let rest = bwt[start..pos].iter().filter(|&&ch| ch == s).count();
    sampled + rest as u32
}

/// 一趟计频 + 前缀和得 C 表；再一趟扫 BWT 写出每块块首的累计计数。
fn build_rank_tables(bwt: &[u8], sigma: usize, block: usize) -> (Vec<u32>, Vec<u32>) {
    let n = bwt.len();

    let mut freq = vec![0u32; sigma];
    for &s in bwt {
        freq[s as usize] += 1;
    }
    let mut c = vec![0u32; sigma];
    let mut acc = 0u32;
    for s in 0..sigma {
        c[s] = acc;
        acc += freq[s];
    }

    let num_blocks = (n + block - 1) / block;
    let mut occ_samples = vec![0u32; num_blocks * sigma];
    let mut running = vec![0u32; sigma];
    for bi in 0..num_blocks {
        occ_samples[bi * sigma..(bi + 1) * sigma].copy_from_slice(&running);
        let start = bi * block;
        let end = ((bi + 1) * block).min(n);
        for &s in &bwt[start..end] {
            running[s as usize] += 1;
        }
    }

    (c, occ_samples)
}
