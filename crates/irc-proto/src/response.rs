//! Numeric replies used by the core (spec §6).

#![allow(non_camel_case_types)]

/// An IRC numeric reply code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Response {
    /// 001
    RPL_WELCOME,
    /// 002
    RPL_YOURHOST,
    /// 003
    RPL_CREATED,
    /// 004
    RPL_MYINFO,
    /// 301
    RPL_AWAY,
    /// 302
    RPL_USERHOST,
    /// 303
    RPL_ISON,
    /// 305
    RPL_UNAWAY,
    /// 306
    RPL_NOWAWAY,
    /// 311
    RPL_WHOISUSER,
    /// 312
    RPL_WHOISSERVER,
    /// 313
    RPL_WHOISOPERATOR,
    /// 315
    RPL_ENDOFWHO,
    /// 317
    RPL_WHOISIDLE,
    /// 318
    RPL_ENDOFWHOIS,
    /// 319
    RPL_WHOISCHANNELS,
    /// 321
    RPL_LISTSTART,
    /// 322
    RPL_LIST,
    /// 323
    RPL_LISTEND,
    /// 324
    RPL_CHANNELMODEIS,
    /// 331
    RPL_NOTOPIC,
    /// 332
    RPL_TOPIC,
    /// 341
    RPL_INVITING,
    /// 352
    RPL_WHOREPLY,
    /// 353
    RPL_NAMREPLY,
    /// 366
    RPL_ENDOFNAMES,
    /// 381
    RPL_YOUREOPER,
    /// 401
    ERR_NOSUCHNICK,
    /// 403
    ERR_NOSUCHCHANNEL,
    /// 404
    ERR_CANNOTSENDTOCHAN,
    /// 421
    ERR_UNKNOWNCOMMAND,
    /// 431
    ERR_NONICKNAMEGIVEN,
    /// 432
    ERR_ERRONEOUSNICKNAME,
    /// 433
    ERR_NICKNAMEINUSE,
    /// 441
    ERR_USERNOTINCHANNEL,
    /// 442
    ERR_NOTONCHANNEL,
    /// 443
    ERR_USERONCHANNEL,
    /// 451
    ERR_NOTREGISTERED,
    /// 461
    ERR_NEEDMOREPARAMS,
    /// 462
    ERR_ALREADYREGISTERED,
    /// 464
    ERR_PASSWDMISMATCH,
    /// 471
    ERR_CHANNELISFULL,
    /// 473
    ERR_INVITEONLYCHAN,
    /// 474
    ERR_BANNEDFROMCHAN,
    /// 475
    ERR_BADCHANNELKEY,
    /// 482
    ERR_CHANOPRIVSNEEDED,
}

impl Response {
    /// The 3-digit numeric code.
    pub fn code(self) -> u16 {
        match self {
            Response::RPL_WELCOME => 1,
            Response::RPL_YOURHOST => 2,
            Response::RPL_CREATED => 3,
            Response::RPL_MYINFO => 4,
            Response::RPL_AWAY => 301,
            Response::RPL_USERHOST => 302,
            Response::RPL_ISON => 303,
            Response::RPL_UNAWAY => 305,
            Response::RPL_NOWAWAY => 306,
            Response::RPL_WHOISUSER => 311,
            Response::RPL_WHOISSERVER => 312,
            Response::RPL_WHOISOPERATOR => 313,
            Response::RPL_ENDOFWHO => 315,
            Response::RPL_WHOISIDLE => 317,
            Response::RPL_ENDOFWHOIS => 318,
            Response::RPL_WHOISCHANNELS => 319,
            Response::RPL_LISTSTART => 321,
            Response::RPL_LIST => 322,
            Response::RPL_LISTEND => 323,
            Response::RPL_CHANNELMODEIS => 324,
            Response::RPL_NOTOPIC => 331,
            Response::RPL_TOPIC => 332,
            Response::RPL_INVITING => 341,
            Response::RPL_WHOREPLY => 352,
            Response::RPL_NAMREPLY => 353,
            Response::RPL_ENDOFNAMES => 366,
            Response::RPL_YOUREOPER => 381,
            Response::ERR_NOSUCHNICK => 401,
            Response::ERR_NOSUCHCHANNEL => 403,
            Response::ERR_CANNOTSENDTOCHAN => 404,
            Response::ERR_UNKNOWNCOMMAND => 421,
            Response::ERR_NONICKNAMEGIVEN => 431,
            Response::ERR_ERRONEOUSNICKNAME => 432,
            Response::ERR_NICKNAMEINUSE => 433,
            Response::ERR_USERNOTINCHANNEL => 441,
            Response::ERR_NOTONCHANNEL => 442,
            Response::ERR_USERONCHANNEL => 443,
            Response::ERR_NOTREGISTERED => 451,
            Response::ERR_NEEDMOREPARAMS => 461,
            Response::ERR_ALREADYREGISTERED => 462,
            Response::ERR_PASSWDMISMATCH => 464,
            Response::ERR_CHANNELISFULL => 471,
            Response::ERR_INVITEONLYCHAN => 473,
            Response::ERR_BANNEDFROMCHAN => 474,
            Response::ERR_BADCHANNELKEY => 475,
            Response::ERR_CHANOPRIVSNEEDED => 482,
        }
    }

    /// Look a numeric code up, returning `None` for codes outside the set
    /// this core emits.
    pub fn from_code(code: u16) -> Option<Response> {
        use Response::*;
        Some(match code {
            1 => RPL_WELCOME,
            2 => RPL_YOURHOST,
            3 => RPL_CREATED,
            4 => RPL_MYINFO,
            301 => RPL_AWAY,
            302 => RPL_USERHOST,
            303 => RPL_ISON,
            305 => RPL_UNAWAY,
            306 => RPL_NOWAWAY,
            311 => RPL_WHOISUSER,
            312 => RPL_WHOISSERVER,
            313 => RPL_WHOISOPERATOR,
            315 => RPL_ENDOFWHO,
            317 => RPL_WHOISIDLE,
            318 => RPL_ENDOFWHOIS,
            319 => RPL_WHOISCHANNELS,
            321 => RPL_LISTSTART,
            322 => RPL_LIST,
            323 => RPL_LISTEND,
            324 => RPL_CHANNELMODEIS,
            331 => RPL_NOTOPIC,
            332 => RPL_TOPIC,
            341 => RPL_INVITING,
            352 => RPL_WHOREPLY,
            353 => RPL_NAMREPLY,
            366 => RPL_ENDOFNAMES,
            381 => RPL_YOUREOPER,
            401 => ERR_NOSUCHNICK,
            403 => ERR_NOSUCHCHANNEL,
            404 => ERR_CANNOTSENDTOCHAN,
            421 => ERR_UNKNOWNCOMMAND,
            431 => ERR_NONICKNAMEGIVEN,
            432 => ERR_ERRONEOUSNICKNAME,
            433 => ERR_NICKNAMEINUSE,
            441 => ERR_USERNOTINCHANNEL,
            442 => ERR_NOTONCHANNEL,
            443 => ERR_USERONCHANNEL,
            451 => ERR_NOTREGISTERED,
            461 => ERR_NEEDMOREPARAMS,
            462 => ERR_ALREADYREGISTERED,
            464 => ERR_PASSWDMISMATCH,
            471 => ERR_CHANNELISFULL,
            473 => ERR_INVITEONLYCHAN,
            474 => ERR_BANNEDFROMCHAN,
            475 => ERR_BADCHANNELKEY,
            482 => ERR_CHANOPRIVSNEEDED,
            _ => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_code() {
        for code in [1u16, 433, 482, 366] {
            let resp = Response::from_code(code).unwrap();
            assert_eq!(resp.code(), code);
        }
    }
}
