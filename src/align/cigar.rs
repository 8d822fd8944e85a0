use thiserror::Error;

/// 不符合文法 `^(\d+[MID])*$` 的 CIGAR 串。携带出错的原文；
/// 两个实例当且仅当原文相同时相等，与违反哪条文法规则无关。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid cigar: {0}")]
pub struct InvalidCigar(pub String);

impl InvalidCigar {
    pub fn new(cigar: &str) -> Self {
        Self(cigar.to_string())
    }
}

/// 单步编辑操作。替换不单独成类：它是一个对位字符不同的 M。
/// I 表示查询串多出一个字符，D 表示参考串多出一个字符。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOp {
    M,
    I,
    D,
}

impl EditOp {
    #[inline]
    fn letter(self) -> char {
        match self {
            EditOp::M => 'M',
            EditOp::I => 'I',
            EditOp::D => 'D',
        }
    }
}

pub type EditOps = Vec<EditOp>;

/// 把编辑操作序列按游程编码成 CIGAR 文本。
/// 空序列编码为空串。
pub fn ops_to_cigar(ops: &[EditOp]) -> String {
    let mut out = String::new();
    let mut iter = ops.iter().peekable();
    while let Some(&op) = iter.next() {
        let mut run = 1usize;
        while iter.peek() == Some(&&op) {
            iter.next();
            run += 1;
        }
        out.push_str(&run.to_string());
        out.push(op.letter());
    }
    out
}

/// 把 CIGAR 文本解析回展开的编辑操作序列。
/// `""` 解码为空序列；任何不是 `<正整数><M|I|D>` 游程序列的输入
/// 都被拒绝。
pub fn cigar_to_ops(cigar: &str) -> Result<EditOps, InvalidCigar> {
    let mut ops = EditOps::new();
    let bytes = cigar.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        let digits_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == digits_start || i == bytes.len() {
            // no count, or a count with no trailing letter
            return Err(InvalidCigar::new(cigar));
        }
        let run: usize = cigar[digits_start..i]
            .parse()
            .map_err(|_| InvalidCigar::new(cigar))?;
        if run == 0 {
            return Err(InvalidCigar::new(cigar));
        }
        let op = match bytes[i] {
            b'M' => EditOp::M,
            b'I' => EditOp::I,
            b'D' => EditOp::D,
            _ => return Err(InvalidCigar::new(cigar)),
        };
        i += 1;
        ops.extend(std::iter::repeat(op).take(run));
    }

    Ok(ops)
}
