//! Business message definitions, one module per message family.
//!
//! Field names, XML attribute names, defaults and list minima follow the
//! UFTP 3.x schema. Scalar values are XML attributes; repeated rows (ISPs,
//! connections, congestion points, profiles) are child elements.

pub mod agr_portfolio_query;
pub mod agr_portfolio_update;
pub mod d_prognosis;
pub mod dso_portfolio_query;
pub mod dso_portfolio_update;
pub mod flex_offer;
pub mod flex_offer_revocation;
pub mod flex_order;
pub mod flex_request;
pub mod flex_reservation_update;
pub mod flex_settlement;
pub mod metering;

pub use agr_portfolio_query::{
    AgrPortfolioQuery, AgrPortfolioQueryResponse, AgrPortfolioQueryResponseCongestionPoint,
    AgrPortfolioQueryResponseConnection, AgrPortfolioQueryResponseDsoPortfolio,
    AgrPortfolioQueryResponseDsoView,
};
pub use agr_portfolio_update::{
    AgrPortfolioUpdate, AgrPortfolioUpdateConnection, AgrPortfolioUpdateResponse,
};
pub use d_prognosis::{DPrognosis, DPrognosisIsp, DPrognosisResponse, FlexOrderStatus};
pub use dso_portfolio_query::{
    DsoPortfolioQuery, DsoPortfolioQueryCongestionPoint, DsoPortfolioQueryConnection,
    DsoPortfolioQueryResponse,
};
pub use dso_portfolio_update::{
    DsoPortfolioUpdate, DsoPortfolioUpdateCongestionPoint, DsoPortfolioUpdateConnection,
    DsoPortfolioUpdateResponse,
};
pub use flex_offer::{FlexOffer, FlexOfferOption, FlexOfferOptionIsp, FlexOfferResponse};
pub use flex_offer_revocation::{FlexOfferRevocation, FlexOfferRevocationResponse};
pub use flex_order::{FlexOrder, FlexOrderIsp, FlexOrderResponse};
pub use flex_request::{FlexRequest, FlexRequestIsp, FlexRequestResponse};
pub use flex_reservation_update::{
    FlexReservationUpdate, FlexReservationUpdateIsp, FlexReservationUpdateResponse,
};
pub use flex_settlement::{
    ContractSettlement, ContractSettlementIsp, ContractSettlementPeriod, FlexOrderSettlement,
    FlexOrderSettlementIsp, FlexOrderSettlementStatus, FlexSettlement, FlexSettlementResponse,
};
pub use metering::{
    Metering, MeteringIsp, MeteringProfile, MeteringProfileKind, MeteringResponse, MeteringUnit,
};
