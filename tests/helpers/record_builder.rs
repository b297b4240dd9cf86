// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================

use chrono::{Datelike, NaiveDate};
use fleet_deviation::domain::{month_name, DeviationRecord, TreatmentStatus};

// ==========================================
// DeviationRecord 构建器
// ==========================================
// 默认构造一条已校验记录（日历字段由日期推导）
pub struct RecordBuilder {
    driver: String,
    deviation_type: String,
    quantity: u32,
    treated: TreatmentStatus,
    treatment_action: String,
    status: String,
    date: NaiveDate,
    is_valid: bool,
}

impl RecordBuilder {
    pub fn new(driver: &str) -> Self {
        Self {
            driver: driver.to_string(),
            deviation_type: "EXCESSO DE VELOCIDADE".to_string(),
            quantity: 1,
            treated: TreatmentStatus::Nao,
            treatment_action: String::new(),
            status: "ABERTO".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            is_valid: true,
        }
    }

    pub fn deviation_type(mut self, deviation_type: &str) -> Self {
        self.deviation_type = deviation_type.to_string();
        self
    }

    pub fn quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn treated(mut self, action: &str) -> Self {
        self.treated = TreatmentStatus::Sim;
        self.treatment_action = action.to_string();
        self
    }

    pub fn status(mut self, status: &str) -> Self {
        self.status = status.to_string();
        self
    }

    pub fn date(mut self, year: i32, month: u32, day: u32) -> Self {
        self.date = NaiveDate::from_ymd_opt(year, month, day).unwrap();
        self
    }

    pub fn invalid(mut self) -> Self {
        self.is_valid = false;
        self
    }

    pub fn build(self) -> DeviationRecord {
        DeviationRecord {
            id: DeviationRecord::new_id(),
            driver: self.driver,
            deviation_type: self.deviation_type,
            quantity: self.quantity,
            month: month_name(self.date.month()).unwrap_or_default().to_string(),
            treated: self.treated,
            treatment_action: self.treatment_action,
            date: self.date.format("%Y-%m-%d").to_string(),
            status: self.status,
            applied_by: String::new(),
            year: Some(self.date.year()),
            month_number: Some(self.date.month()),
            week: Some(self.date.iso_week().week()),
            is_valid: self.is_valid,
        }
    }
}

/// 驾驶舱常用样例集
pub fn fleet_records() -> Vec<DeviationRecord> {
    vec![
        RecordBuilder::new("JOÃO SILVA").quantity(3).treated("ADVERTÊNCIA").build(),
        RecordBuilder::new("JOÃO SILVA")
            .deviation_type("FREADA BRUSCA")
            .quantity(2)
            .date(2024, 2, 14)
            .build(),
        RecordBuilder::new("MARIA SOUZA")
            .deviation_type("USO DE CELULAR")
            .quantity(5)
            .status("FECHADO")
            .treated("TREINAMENTO")
            .date(2024, 2, 20)
            .build(),
        RecordBuilder::new("CARLOS LIMA")
            .deviation_type("FREADA BRUSCA")
            .quantity(1)
            .date(2024, 3, 1)
            .build(),
        RecordBuilder::new("ANA SILVEIRA").quantity(0).date(2024, 3, 9).build(),
    ]
}
