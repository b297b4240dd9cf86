// ==========================================
// 车队驾驶偏差管理系统 - 汇报幻灯片大纲
// ==========================================
// 职责: 驾驶舱视图 → 幻灯片结构（由外部渲染器生成 PPT/PDF）
// 结构:
// 1. 封面（标题、日期、当前筛选）
// 2. 驾驶员排名（前 N）
// 3. 每个偏差类型一页（月度走势 + 累计）
// 4. 汇总表（类型、累计、占比 %）
// ==========================================

use crate::engine::{DashboardView, NameValue};
use crate::exporter::error::ExportResult;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const REPORT_TITLE: &str = "Gestão de Desvios";
pub const SUMMARY_TITLE: &str = "DETALHAMENTO CONSOLIDADO";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Slide {
    Cover {
        title: String,
        date: String,
        filters: String,
    },
    DriverRanking {
        title: String,
        entries: Vec<NameValue>,
    },
    TypeEvolution {
        deviation_type: String,
        months: Vec<NameValue>,
        total: u64,
    },
    Summary {
        title: String,
        rows: Vec<SummaryRow>,
    },
}

/// 汇总表行：占比 = 类型累计 / 筛选后总量 × 100（一位小数，总量为 0 时分母记 1）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub deviation_type: String,
    pub total: u64,
    pub impact_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportDeck {
    pub slides: Vec<Slide>,
}

impl ReportDeck {
    pub fn build(view: &DashboardView, generated_on: NaiveDate) -> Self {
        let mut slides = Vec::with_capacity(view.monthly_evolution.len() + 3);

        slides.push(Slide::Cover {
            title: REPORT_TITLE.to_string(),
            date: generated_on.format("%d/%m/%Y").to_string(),
            filters: view.filter.describe(),
        });
        slides.push(Slide::DriverRanking {
            title: format!("Top {} Motoristas", view.driver_ranking.len()),
            entries: view.driver_ranking.clone(),
        });
        slides.extend(view.monthly_evolution.iter().map(|evolution| Slide::TypeEvolution {
            deviation_type: evolution.deviation_type.clone(),
            months: evolution.months.clone(),
            total: evolution.total,
        }));

        let divisor = view.kpis.total_quantity.max(1) as f64;
        slides.push(Slide::Summary {
            title: SUMMARY_TITLE.to_string(),
            rows: view
                .monthly_evolution
                .iter()
                .map(|evolution| SummaryRow {
                    deviation_type: evolution.deviation_type.clone(),
                    total: evolution.total,
                    impact_percent: (evolution.total as f64 / divisor * 1000.0).round() / 10.0,
                })
                .collect(),
        });

        Self { slides }
    }

    pub fn to_json(&self) -> ExportResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
