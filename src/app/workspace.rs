// ==========================================
// 车队驾驶偏差管理系统 - 工作区
// ==========================================
// 职责: 持有唯一的记录集（表格数据）与最近一次清洗的校验错误
// 约定:
// - 每次修改记录集 revision + 1（驾驶舱缓存按 revision 失效）
// - 单元格编辑只替换字段，不重新校验
// ==========================================

use crate::domain::{CellValue, DeviationRecord, RecordField, ValidationError};
use chrono::NaiveDate;

#[derive(Debug, Default)]
pub struct Workspace {
    records: Vec<DeviationRecord>,
    errors: Vec<ValidationError>,
    revision: u64,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[DeviationRecord] {
        &self.records
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 有效记录（BASE_TRATADA）
    pub fn valid_records(&self) -> Vec<DeviationRecord> {
        self.records.iter().filter(|r| r.is_valid).cloned().collect()
    }

    pub fn get(&self, id: &str) -> Option<&DeviationRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// 整体替换（导入 / 云端加载 / 重新清洗）
    pub fn replace_all(&mut self, records: Vec<DeviationRecord>, errors: Vec<ValidationError>) {
        self.records = records;
        self.errors = errors;
        self.bump();
    }

    /// 在表头插入空白行，返回新行 id
    pub fn add_blank_row(&mut self, today: NaiveDate) -> String {
        let record = DeviationRecord::blank(today);
        let id = record.id.clone();
        self.records.insert(0, record);
        self.bump();
        id
    }

    /// 编辑单元格
    ///
    /// # 返回
    /// - true: 找到记录并已修改
    /// - false: id 不存在
    pub fn update_cell(&mut self, id: &str, field: RecordField, value: &CellValue) -> bool {
        match self.records.iter_mut().find(|r| r.id == id) {
            Some(record) => {
                record.set_field(field, value);
                self.bump();
                true
            }
            None => false,
        }
    }

    /// 删除记录，返回被删除的记录
    pub fn remove(&mut self, id: &str) -> Option<DeviationRecord> {
        let index = self.records.iter().position(|r| r.id == id)?;
        let removed = self.records.remove(index);
        self.bump();
        Some(removed)
    }

    fn bump(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}
