//! 业务数据模型
//!
//! 与 `entity` 中的数据库实体分离，所有时间均为 UTC。

pub mod assignments {
    pub mod entities;
    pub mod requests;
    pub mod responses;
}

pub mod grades {
    pub mod entities;
    pub mod requests;
}

pub mod notifications {
    pub mod entities;
    pub mod responses;
}

pub mod papers {
    pub mod entities;
    pub mod requests;
    pub mod responses;
}

pub mod users {
    pub mod entities;
    pub mod requests;
}
