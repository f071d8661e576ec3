//! Myers O(ND) difference algorithm over arbitrary unit slices.
//!
//! Produces an edit script of `(Edit, run length)` pairs. Runs are measured
//! in units, so the same code diffs chars and embeds alike.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edit {
    Del,
    Eql,
    Ins,
}

pub type Script = Vec<(Edit, usize)>;

/// Appends a run, merging with the previous run of the same kind.
fn push(script: &mut Script, edit: Edit, len: usize) {
    if len == 0 {
        return;
    }
    match script.last_mut() {
        Some((last, n)) if *last == edit => *n += len,
        _ => script.push((edit, len)),
    }
}

fn extend(script: &mut Script, more: Script) {
    for (edit, len) in more {
        push(script, edit, len);
    }
}

pub fn common_prefix<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

pub fn common_suffix<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    a.iter()
        .rev()
        .zip(b.iter().rev())
        .take_while(|(x, y)| x == y)
        .count()
}

/// Edit script turning `src` into `dst`.
pub fn diff<T: PartialEq>(src: &[T], dst: &[T]) -> Script {
    let mut script = Script::new();
    let prefix = common_prefix(src, dst);
    let (src, dst) = (&src[prefix..], &dst[prefix..]);
    let suffix = common_suffix(src, dst);
    let (src, dst) = (&src[..src.len() - suffix], &dst[..dst.len() - suffix]);

    push(&mut script, Edit::Eql, prefix);
    extend(&mut script, diff_no_common_affix(src, dst));
    push(&mut script, Edit::Eql, suffix);
    script
}

/// Fast path for the common case of a single insertion or deletion that
/// ends at `caret` in `dst`. Falls back to [`diff`] otherwise.
pub fn diff_edit<T: PartialEq>(src: &[T], dst: &[T], caret: usize) -> Script {
    let (src_len, dst_len) = (src.len(), dst.len());
    if src_len != dst_len && caret <= dst_len {
        let dst_sfx = &dst[caret..];
        let sfx_len = dst_sfx.len();
        if sfx_len <= src_len && src[src_len - sfx_len..] == *dst_sfx {
            if dst_len > src_len {
                let pfx_len = src_len - sfx_len;
                if pfx_len <= caret && src[..pfx_len] == dst[..pfx_len] {
                    let mut script = Script::new();
                    push(&mut script, Edit::Eql, pfx_len);
                    push(&mut script, Edit::Ins, caret - pfx_len);
                    push(&mut script, Edit::Eql, sfx_len);
                    return script;
                }
            } else {
                let pfx_len = dst_len - sfx_len;
                if src[..pfx_len] == dst[..pfx_len] {
                    let mut script = Script::new();
                    push(&mut script, Edit::Eql, pfx_len);
                    push(&mut script, Edit::Del, src_len - sfx_len - pfx_len);
                    push(&mut script, Edit::Eql, sfx_len);
                    return script;
                }
            }
        }
    }
    diff(src, dst)
}

fn find_slice<T: PartialEq>(haystack: &[T], needle: &[T]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    if needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn diff_no_common_affix<T: PartialEq>(c1: &[T], c2: &[T]) -> Script {
    if c1.is_empty() {
        let mut script = Script::new();
        push(&mut script, Edit::Ins, c2.len());
        return script;
    }
    if c2.is_empty() {
        return vec![(Edit::Del, c1.len())];
    }

    // Shorter text fully contained in the longer one.
    let (long, short, long_is_src) = if c1.len() > c2.len() {
        (c1, c2, true)
    } else {
        (c2, c1, false)
    };
    if let Some(idx) = find_slice(long, short) {
        let edit = if long_is_src { Edit::Del } else { Edit::Ins };
        let mut script = Script::new();
        push(&mut script, edit, idx);
        push(&mut script, Edit::Eql, short.len());
        push(&mut script, edit, long.len() - idx - short.len());
        return script;
    }

    if short.len() == 1 {
        return vec![(Edit::Del, c1.len()), (Edit::Ins, c2.len())];
    }

    bisect(c1, c2)
}

/// Finds the middle snake and splits the problem in two.
fn bisect<T: PartialEq>(c1: &[T], c2: &[T]) -> Script {
    let n1 = c1.len() as i64;
    let n2 = c2.len() as i64;
    let max_d = (n1 + n2 + 1) / 2 + 1;
    let v_offset = max_d;
    let v_length = 2 * max_d;

    let mut v1: Vec<i64> = vec![-1; v_length as usize];
    let mut v2: Vec<i64> = vec![-1; v_length as usize];
    v1[(v_offset + 1) as usize] = 0;
    v2[(v_offset + 1) as usize] = 0;

    let delta = n1 - n2;
    let front = delta % 2 != 0;

    let mut k1start = 0i64;
    let mut k1end = 0i64;
    let mut k2start = 0i64;
    let mut k2end = 0i64;

    for d in 0..max_d {
        // Forward path.
        let mut k1 = -d + k1start;
        while k1 <= d - k1end {
            let k1_offset = (v_offset + k1) as usize;
            let mut x1 = if k1 == -d || (k1 != d && v1[k1_offset - 1] < v1[k1_offset + 1]) {
                v1[k1_offset + 1]
            } else {
                v1[k1_offset - 1] + 1
            };
            let mut y1 = x1 - k1;
            while x1 < n1 && y1 < n2 && c1[x1 as usize] == c2[y1 as usize] {
                x1 += 1;
                y1 += 1;
            }
            v1[k1_offset] = x1;
            if x1 > n1 {
                k1end += 2;
            } else if y1 > n2 {
                k1start += 2;
            } else if front {
                let k2_offset = v_offset + delta - k1;
                if k2_offset >= 0 && k2_offset < v_length && v2[k2_offset as usize] != -1 {
                    let x2 = n1 - v2[k2_offset as usize];
                    if x1 >= x2 {
                        return bisect_split(c1, c2, x1 as usize, y1 as usize);
                    }
                }
            }
            k1 += 2;
        }

        // Reverse path.
        let mut k2 = -d + k2start;
        while k2 <= d - k2end {
            let k2_offset = (v_offset + k2) as usize;
            let mut x2 = if k2 == -d || (k2 != d && v2[k2_offset - 1] < v2[k2_offset + 1]) {
                v2[k2_offset + 1]
            } else {
                v2[k2_offset - 1] + 1
            };
            let mut y2 = x2 - k2;
            while x2 < n1
                && y2 < n2
                && c1[(n1 - 1 - x2) as usize] == c2[(n2 - 1 - y2) as usize]
            {
                x2 += 1;
                y2 += 1;
            }
            v2[k2_offset] = x2;
            if x2 > n1 {
                k2end += 2;
            } else if y2 > n2 {
                k2start += 2;
            } else if !front {
                let k1_offset = v_offset + delta - k2;
                if k1_offset >= 0 && k1_offset < v_length && v1[k1_offset as usize] != -1 {
                    let x1 = v1[k1_offset as usize];
                    let y1 = v_offset + x1 - k1_offset;
                    if x1 >= n1 - x2 {
                        return bisect_split(c1, c2, x1 as usize, y1 as usize);
                    }
                }
            }
            k2 += 2;
        }
    }

    // No commonality at all.
    vec![(Edit::Del, c1.len()), (Edit::Ins, c2.len())]
}

fn bisect_split<T: PartialEq>(c1: &[T], c2: &[T], x: usize, y: usize) -> Script {
    let mut script = diff(&c1[..x], &c2[..y]);
    extend(&mut script, diff(&c1[x..], &c2[y..]));
    script
}
