//! 考勤采集与审批工作流
//!
//! 教师可直接点名，也可将某班某日的考勤委派给课代表收集，再由教师审批或驳回。
//! 在记录之上提供出勤率与班级报表统计。
//!
//! # 架构
//! - `config`: 配置管理
//! - `entity`: SeaORM 数据库实体
//! - `errors`: 统一错误处理
//! - `models`: 领域模型与状态机
//! - `runtime`: 运行时生命周期管理
//! - `services`: 业务编排与领域事件
//! - `storage`: 数据存储层（SeaORM）
//! - `utils`: 工具函数

pub mod config;
pub mod entity;
pub mod errors;
pub mod models;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod utils;
