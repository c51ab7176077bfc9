use anchor_lang::prelude::*;

#[error_code]
pub enum ErrorCode {
    #[msg("Caller is not the farm admin")]
    Unauthorized,

    #[msg("Pool id is outside the pool registry")]
    InvalidPool,

    #[msg("Withdraw amount exceeds staked amount")]
    InsufficientStake,

    #[msg("Token transfer or mint failed")]
    TransferFailed,

    #[msg("Arithmetic overflow occurred")]
    ArithmeticOverflow,

    #[msg("Invalid parameter provided")]
    InvalidParam,

    #[msg("Remaining accounts must list every pool in id order")]
    PoolListMismatch,

    #[msg("Missing remaining account")]
    MissingRemainingAccount,

    #[msg("Position does not belong to this pool and owner")]
    PositionMismatch,

    #[msg("Invalid vault account")]
    InvalidVault,

    #[msg("Token account or mint does not match the pool")]
    InvalidMint,

    #[msg("Farm authority is not the mint authority of the reward mint")]
    MissingMintAuthority,

    #[msg("Too many calls in one batch")]
    TooManyBatchCalls,

    #[msg("Pool registry is full")]
    PoolLimitReached,

    #[msg("Staked mint and reward mint must share a token program")]
    TokenProgramMismatch,
}
