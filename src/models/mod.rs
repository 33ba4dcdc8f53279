pub mod room;
pub mod user;

pub use room::{CreateRoomRequest, CreateRoomResponse, Room, RoomResponse};
pub use user::{Claims, GuestRequest, GuestResponse};
