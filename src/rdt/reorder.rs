//! 接收端乱序缓冲
//!
//! 保存序号大于当前期望值的报文，按序号升序、无重复；
//! 当缓冲头部的序号等于期望值时，弹出的一定是一段连续前缀。

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use super::packet::Packet;

#[derive(Debug, Clone, Default)]
pub struct ReorderBuffer {
    held: BTreeMap<u32, Packet>,
}

impl ReorderBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.held.len()
    }

    pub fn is_empty(&self) -> bool {
        self.held.is_empty()
    }

    pub fn contains(&self, seq: u32) -> bool {
        self.held.contains_key(&seq)
    }

    /// 升序的缓冲序号
    pub fn seqs(&self) -> impl Iterator<Item = u32> + '_ {
        self.held.keys().copied()
    }

    /// 放入一个提前到达的报文。已存在同序号报文时丢弃新报文并返回 `false`。
    pub fn insert(&mut self, pkt: Packet) -> bool {
        match self.held.entry(pkt.seq()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(pkt);
                true
            }
        }
    }

    /// 如果缓冲头部正好是 `expected`，弹出它。
    pub fn pop_if_next(&mut self, expected: u32) -> Option<Packet> {
        let entry = self.held.first_entry()?;
        if *entry.key() == expected {
            Some(entry.remove())
        } else {
            None
        }
    }
}
