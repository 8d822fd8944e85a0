use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 查询串含有构建索引时不存在的字符。可恢复错误：由调用方决定
/// 跳过该串还是中止。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("byte {0} is not in alphabet")]
pub struct AlphabetLookupError(pub char);

/// 紧凑字母表：把文本中实际出现的符号映射到稠密编码区间 [1..=k]。
/// 编码 0 预留给文本末尾的哨兵符（$），在任何输入串中都不会出现，
/// 因此哨兵在字典序中严格小于所有符号。
///
/// 每个参考序列构建一次，之后只读；随 FM 索引一起序列化，
/// 保证索引和查询串共享同一编码空间。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Alphabet {
    /// 按字节值升序排列的符号集；`symbols[i]` 的编码为 `i + 1`。
    symbols: Vec<u8>,
}

impl Alphabet {
    /// 收集 `text` 中出现过的字符，按字节值升序分配编码。
    /// 确定性：同一文本总是得到同一映射。
    pub fn new(text: &str) -> Self {
        let mut seen = [false; 256];
        for &b in text.as_bytes() {
            seen[b as usize] = true;
        }
        let symbols: Vec<u8> = (0u16..256)
            .filter(|&b| seen[b as usize])
            .map(|b| b as u8)
            .collect();
        Self { symbols }
    }

    /// 字母表大小（含哨兵编码 0）。
    #[inline]
    pub fn sigma(&self) -> usize {
        self.symbols.len() + 1
    }

    #[inline]
    fn code(&self, b: u8) -> Option<u8> {
        self.symbols.binary_search(&b).ok().map(|i| (i + 1) as u8)
    }

    /// 把 `s` 的每个字符映射进编码空间。遇到第一个不在字母表里的
    /// 字符即失败，错误里带上该字符。
    pub fn map_to_bytes(&self, s: &str) -> Result<Vec<u8>, AlphabetLookupError> {
        s.as_bytes()
            .iter()
            .map(|&b| self.code(b).ok_or(AlphabetLookupError(b as char)))
            .collect()
    }

    /// 单个编码的逆映射（[`map_to_bytes`](Self::map_to_bytes) 的反向）；
    /// 哨兵显示为 `$`。
    #[inline]
    pub fn decode(&self, code: u8) -> u8 {
        if code == 0 {
            b'$'
        } else {
            self.symbols[code as usize - 1]
        }
    }

    /// 所有编码是否都落在 `[0, sigma)` 内；反序列化校验用。
    pub fn codes_in_range(&self, codes: &[u8]) -> bool {
        let sigma = self.sigma() as u8;
        codes.iter().all(|&c| c < sigma)
    }
}
